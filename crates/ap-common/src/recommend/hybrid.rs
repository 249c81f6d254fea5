use std::collections::HashMap;

use super::{MatchType, Recommendation, sort_by_score_desc};
use crate::matching::{round_to_tenth, weights::HYBRID_BLEND};

pub const SHARED_INTEREST_EXPLANATION: &str = "Similar parents also liked this au pair";

struct Blended {
    recommendation: Recommendation,
    score: f64,
    fragments: Vec<String>,
}

/// Merge content and collaborative results by candidate id.
///
/// Content entries come first and keep their order; collaborative-only
/// candidates follow. A side the candidate is missing from contributes 0.
pub fn blend(
    content: Vec<Recommendation>,
    collaborative: Vec<Recommendation>,
    limit: usize,
) -> Vec<Recommendation> {
    let mut merged: Vec<Blended> = Vec::with_capacity(content.len() + collaborative.len());
    let mut index: HashMap<i64, usize> = HashMap::new();

    for rec in content {
        index.insert(rec.candidate.id, merged.len());
        merged.push(Blended {
            score: rec.compatibility_score * HYBRID_BLEND.content,
            fragments: vec![rec.match_explanation.clone()],
            recommendation: rec,
        });
    }

    for rec in collaborative {
        let score = rec.compatibility_score * HYBRID_BLEND.collaborative;
        match index.get(&rec.candidate.id) {
            Some(&slot) => {
                let entry = &mut merged[slot];
                entry.score += score;
                entry.fragments.push(SHARED_INTEREST_EXPLANATION.to_string());
            }
            None => {
                index.insert(rec.candidate.id, merged.len());
                merged.push(Blended {
                    score,
                    fragments: vec![rec.match_explanation.clone()],
                    recommendation: rec,
                });
            }
        }
    }

    sort_by_score_desc(&mut merged, |b| b.score);
    merged.truncate(limit);

    merged
        .into_iter()
        .map(|b| {
            let explanation = b
                .fragments
                .iter()
                .filter(|f| !f.is_empty())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; ");

            Recommendation {
                compatibility_score: round_to_tenth(b.score),
                match_explanation: explanation,
                match_type: MatchType::Hybrid,
                ..b.recommendation
            }
        })
        .collect()
}
