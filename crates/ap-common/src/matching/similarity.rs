use super::{
    location::region_match,
    round_to_tenth,
    skills::skill_set_similarity,
    weights::{SIMILARITY_WEIGHTS, SimilarityWeights},
};
use crate::Candidate;

/// 1.0 for the same age, falling to 0 at ten years apart.
pub fn age_closeness(a: i32, b: i32) -> f64 {
    (1.0 - f64::from((a - b).abs()) / 10.0).max(0.0)
}

/// 1.0 for equal ratings, falling to 0 at two stars apart.
pub fn rating_closeness(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs() / 2.0).max(0.0)
}

/// Candidate-to-candidate similarity on the 0..=100 scale, one decimal.
pub fn candidate_similarity(reference: &Candidate, other: &Candidate) -> f64 {
    weighted_similarity(&SIMILARITY_WEIGHTS, reference, other)
}

pub fn weighted_similarity(w: &SimilarityWeights, reference: &Candidate, other: &Candidate) -> f64 {
    let total = w.skills * skill_set_similarity(&reference.skills, &other.skills)
        + w.region * region_match(reference.region.as_deref(), other.region.as_deref())
        + w.age * age_closeness(reference.age, other.age)
        + w.rating * rating_closeness(reference.rating_or_neutral(), other.rating_or_neutral());

    round_to_tenth(total * 100.0)
}
