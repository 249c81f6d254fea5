//! Counter names shared by the engine and the Prometheus exporter.

pub const RECOMMENDATIONS_TOTAL: &str = "ap_recommendations_total";
pub const EXTERNAL_FALLBACKS_TOTAL: &str = "ap_external_fallbacks_total";
pub const RATINGS_TOTAL: &str = "ap_ratings_total";
