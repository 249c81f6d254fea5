use std::collections::HashMap;

use super::{MatchType, Recommendation, sort_by_score_desc};
use crate::{
    Candidate,
    matching::{round_to_tenth, weights::COLLABORATIVE_SCALE},
    store::{PositiveRating, SimilarRequester},
};

pub const COLLABORATIVE_EXPLANATION: &str = "Recommended by parents with similar preferences";

/// Rank available candidates by the weighted positive ratings of similar
/// requesters. Candidates nobody similar rated are left out entirely.
pub fn rank(
    signals: &[(SimilarRequester, Vec<PositiveRating>)],
    pool: &[Candidate],
    limit: usize,
) -> Vec<Recommendation> {
    if signals.is_empty() {
        return Vec::new();
    }

    let mut totals: HashMap<i64, f64> = HashMap::new();
    for (requester, ratings) in signals {
        for rating in ratings {
            *totals.entry(rating.candidate_id).or_default() +=
                f64::from(rating.score) * requester.similarity_weight;
        }
    }

    let similar_count = signals.len() as f64;
    let mut ranked: Vec<Recommendation> = pool
        .iter()
        .filter_map(|candidate| {
            let total = totals.get(&candidate.id)?;
            Some(Recommendation {
                candidate: candidate.clone(),
                compatibility_score: round_to_tenth(total / similar_count * COLLABORATIVE_SCALE),
                match_explanation: COLLABORATIVE_EXPLANATION.to_string(),
                match_type: MatchType::Collaborative,
            })
        })
        .collect();

    sort_by_score_desc(&mut ranked, |r| r.compatibility_score);
    ranked.truncate(limit);
    ranked
}
