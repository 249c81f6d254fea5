use serde::{Deserialize, Serialize};

use crate::recommend::{
    MatchType, Recommendation, SimilarCandidate, Strategy,
    custom::{CustomCriteria, CustomRecommendations},
    stats::RecommendationStats,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    /// Strategy the caller asked for.
    pub strategy: Strategy,
    /// What produced the list: the strategy itself, or `ml-<strategy>` when
    /// the external model answered.
    pub source: String,
    pub total_found: usize,
    pub requester_id: i64,
}

impl RecommendationResponse {
    pub fn new(requester_id: i64, strategy: Strategy, recommendations: Vec<Recommendation>) -> Self {
        let delegated = recommendations
            .iter()
            .any(|rec| matches!(rec.match_type, MatchType::External(_)));
        let source = if delegated {
            format!("ml-{strategy}")
        } else {
            strategy.to_string()
        };

        Self {
            total_found: recommendations.len(),
            recommendations,
            strategy,
            source,
            requester_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarResponse {
    pub similar_candidates: Vec<SimilarCandidate>,
    pub reference_candidate_id: i64,
    pub total_found: usize,
}

impl SimilarResponse {
    pub fn new(reference_candidate_id: i64, similar_candidates: Vec<SimilarCandidate>) -> Self {
        Self {
            total_found: similar_candidates.len(),
            similar_candidates,
            reference_candidate_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomResponse {
    pub recommendations: Vec<Recommendation>,
    pub criteria: CustomCriteria,
    pub total_found: usize,
    pub filters_applied: usize,
}

impl From<CustomRecommendations> for CustomResponse {
    fn from(result: CustomRecommendations) -> Self {
        Self {
            total_found: result.recommendations.len(),
            recommendations: result.recommendations,
            criteria: result.criteria,
            filters_applied: result.filters_applied,
        }
    }
}

pub type StatsResponse = RecommendationStats;
