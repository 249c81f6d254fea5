use super::{MatchType, Recommendation, sort_by_score_desc};
use crate::{Candidate, Preferences, matching::scoring::ContentScorer};

/// Score the whole pool and keep the best `limit`.
pub fn rank(
    scorer: &ContentScorer,
    prefs: &Preferences,
    pool: &[Candidate],
    limit: usize,
) -> Vec<Recommendation> {
    let mut scored: Vec<(f64, Recommendation)> = pool
        .iter()
        .map(|candidate| {
            let score = scorer.score(prefs, candidate);
            (
                score.total,
                Recommendation {
                    candidate: candidate.clone(),
                    compatibility_score: score.compatibility(),
                    match_explanation: score.explanation(),
                    match_type: MatchType::ContentBased,
                },
            )
        })
        .collect();

    // Order on the unrounded total so near-ties keep their true order.
    sort_by_score_desc(&mut scored, |(total, _)| *total);
    scored.truncate(limit);
    scored.into_iter().map(|(_, rec)| rec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gender, GenderPreference, matching::skills::Skill};
    use std::collections::BTreeSet;

    fn candidate(id: i64, age: i32, region: &str, skills: &[Skill], experience: i32) -> Candidate {
        Candidate {
            id,
            name: format!("candidate-{id}"),
            age,
            gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
            region: Some(region.into()),
            skills: skills.iter().copied().collect::<BTreeSet<_>>(),
            bio: String::new(),
            rating: None,
            total_ratings: 0,
            experience_years: experience,
            is_available: true,
        }
    }

    fn pool() -> Vec<Candidate> {
        vec![
            candidate(1, 35, "Bali", &[], 0),
            candidate(2, 22, "Jawa Barat", &[Skill::Cooking], 4),
            candidate(3, 20, "DKI Jakarta", &[Skill::Cooking, Skill::Driving], 1),
            candidate(4, 29, "Jawa Timur", &[Skill::Music], 2),
            candidate(5, 19, "Jawa Barat", &[Skill::Cooking, Skill::Driving], 3),
        ]
    }

    fn prefs() -> Preferences {
        Preferences {
            required_skills: vec!["cooking".into(), "driving".into()],
            gender: GenderPreference::Female,
            region: Some("Jawa Barat".into()),
        }
    }

    #[test]
    fn results_are_sorted_non_increasing() {
        let ranked = rank(&ContentScorer::default(), &prefs(), &pool(), 10);

        assert_eq!(ranked.len(), 5);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].compatibility_score >= w[1].compatibility_score));
        assert_eq!(ranked[0].candidate.id, 5);
        assert!(ranked.iter().all(|r| r.match_type == MatchType::ContentBased));
    }

    #[test]
    fn truncates_to_limit() {
        let ranked = rank(&ContentScorer::default(), &prefs(), &pool(), 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn ties_keep_pool_order() {
        let twins = vec![
            candidate(7, 21, "Bali", &[], 0),
            candidate(9, 21, "Bali", &[], 0),
        ];
        let ranked = rank(&ContentScorer::default(), &Preferences::default(), &twins, 2);

        let ids: Vec<i64> = ranked.iter().map(|r| r.candidate.id).collect();
        assert_eq!(ids, vec![7, 9]);
    }

    #[test]
    fn empty_pool_yields_nothing() {
        assert!(rank(&ContentScorer::default(), &prefs(), &[], 5).is_empty());
    }
}
