use std::{future::Future, sync::OnceLock, time::Instant};

use tracing::warn;

fn slow_query_threshold_ms() -> Option<u64> {
    static CACHE: OnceLock<Option<u64>> = OnceLock::new();

    *CACHE.get_or_init(|| {
        std::env::var("AP_DB_LOG_MIN_DURATION_MS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|v| v.max(0) as u64)
            .filter(|v| *v > 0)
    })
}

fn exceeds_threshold(elapsed_ms: u64, threshold_ms: Option<u64>) -> bool {
    threshold_ms.is_some_and(|threshold| elapsed_ms >= threshold)
}

/// Await a query future and warn when it ran past `AP_DB_LOG_MIN_DURATION_MS`.
pub async fn timed<F, T>(label: &'static str, query: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let output = query.await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if exceeds_threshold(elapsed_ms, slow_query_threshold_ms()) {
        warn!(query = label, elapsed_ms, "slow_query_detected");
    }

    output
}
