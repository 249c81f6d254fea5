use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::OnceLock;

use metrics::{Unit, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub use ap_common::telemetry::{EXTERNAL_FALLBACKS_TOTAL, RATINGS_TOTAL, RECOMMENDATIONS_TOTAL};

/// Listen address for the exporter; `None` disables it.
pub fn exporter_addr(port: Option<u16>) -> Option<SocketAddr> {
    port.filter(|p| *p != 0)
        .map(|p| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), p))
}

/// Register help text for the counters the recommendation engine emits.
pub fn describe_metrics() {
    describe_counter!(
        RECOMMENDATIONS_TOTAL,
        Unit::Count,
        "Recommendation lists served, labelled by strategy"
    );
    describe_counter!(
        EXTERNAL_FALLBACKS_TOTAL,
        Unit::Count,
        "External model calls that fell back to local scoring, labelled by reason"
    );
    describe_counter!(RATINGS_TOTAL, Unit::Count, "Ratings recorded");
}

/// Start the Prometheus exporter once per process and describe our counters.
///
/// Must be called from inside a tokio runtime; the scrape listener runs as a
/// task on it.
pub fn init_metrics(port: Option<u16>) -> Option<&'static PrometheusHandle> {
    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    let addr = exporter_addr(port)?;
    let (recorder, exporter) = match PrometheusBuilder::new().with_http_listener(addr).build() {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, metrics_addr = %addr, "failed to build prometheus exporter");
            return None;
        }
    };

    let handle = recorder.handle();
    if let Err(err) = metrics::set_global_recorder(recorder) {
        warn!(error = %err, "a global metrics recorder is already installed");
        return None;
    }

    tokio::spawn(async move {
        // ExporterError implements neither Debug nor Display in 0.15.
        if exporter.await.is_err() {
            warn!("prometheus exporter stopped");
        }
    });

    let _ = PROMETHEUS_HANDLE.set(handle);
    describe_metrics();
    info!(metrics_addr = %addr, "started prometheus exporter");
    PROMETHEUS_HANDLE.get()
}
