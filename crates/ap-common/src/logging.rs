use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Used when `RUST_LOG` is unset. The driver crates are chatty at `info`.
const DEFAULT_FILTER: &str = "info,tokio_postgres=warn,deadpool_postgres=warn";

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload not string".into())
}

/// Route panics through `tracing` so they land in the same sink as other logs.
/// Installed at most once per process.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = env_flag("AP_LOG_INCLUDE_BACKTRACE");

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));

            tracing::error!(
                application = app_name,
                thread_name = thread.name().unwrap_or("unknown"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %panic_message(info.payload()),
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

fn log_dir() -> Option<PathBuf> {
    std::env::var_os("AP_LOG_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

fn rotating_file_writer(app_name: &'static str) -> Option<BoxMakeWriter> {
    let dir = log_dir()?;
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("failed to create AP_LOG_DIR {}: {err}; logging to stdout", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(non_blocking))
}

/// Install the global subscriber.
///
/// Logs go to `<AP_LOG_DIR>/<app>.log` (rotated daily) when `AP_LOG_DIR` is
/// set and to stdout otherwise. `RUST_LOG` overrides the default filter.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(!env_flag("AP_LOG_HIDE_TARGET"));

    let _ = match rotating_file_writer(app_name) {
        Some(writer) => builder.with_ansi(false).with_writer(writer).try_init(),
        None => builder.try_init(),
    };
}
