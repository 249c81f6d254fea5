use serde::{Deserialize, Serialize};

use crate::store::FeedbackType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Candidate ids that were shown to the requester.
    pub recommendation_ids: Vec<i64>,
    pub feedback_type: FeedbackType,
    #[serde(default)]
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_feedback_types() {
        let body = serde_json::json!({"recommendation_ids": [1], "feedback_type": "love_it"});
        assert!(serde_json::from_value::<FeedbackRequest>(body).is_err());
    }
}
