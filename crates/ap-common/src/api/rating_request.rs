use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recommend::RecommendError;

/// Body of `POST /api/recommendations/rate`.
///
/// `score` is kept as raw JSON so a fractional or textual value is reported
/// as an invalid argument like any other out-of-range rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    #[serde(alias = "auPairId")]
    pub candidate_id: i64,
    #[serde(default, alias = "rating")]
    pub score: Value,
}

impl RatingRequest {
    pub fn score(&self) -> Result<i32, RecommendError> {
        let parsed = match &self.score {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };

        parsed
            .and_then(|score| i32::try_from(score).ok())
            .ok_or_else(|| {
                RecommendError::InvalidArgument("rating must be an integer between 1 and 5".into())
            })
    }
}
