use axum::{Json, extract::State};
use serde_json::json;
use tokio::time::Duration;

use ap_common::db::pool::{PingError, ping};

use crate::SharedState;
use crate::error::ApiError;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let database = match &state.pool {
        Some(pool) => {
            ping(pool, READINESS_TIMEOUT).await.map_err(|err| match err {
                PingError::Timeout => ApiError::ServiceUnavailable("db_ping_timeout".into()),
                PingError::Pool(err) => {
                    ApiError::ServiceUnavailable(format!("db_pool_unavailable: {err}"))
                }
                PingError::Postgres(err) => {
                    ApiError::ServiceUnavailable(format!("db_ping_failed: {err}"))
                }
            })?;
            "ok"
        }
        None => "in_memory",
    };

    Ok(Json(json!({
        "status": "ok",
        "database": database,
        "external_model": state.config.external_scorer.is_some(),
        "application": env!("CARGO_PKG_NAME"),
    })))
}
