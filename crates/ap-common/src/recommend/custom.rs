use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::{Recommendation, content};
use crate::{Candidate, GenderPreference, Preferences, matching::scoring::ContentScorer};

pub const MIN_RATING_RANGE: RangeInclusive<f64> = 1.0..=5.0;
pub const MAX_AGE_RANGE: RangeInclusive<i32> = 16..=50;
pub const MIN_EXPERIENCE_RANGE: RangeInclusive<i32> = 0..=10;

/// Ad hoc preferences and hard filters for exploratory searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCriteria {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "is_any")]
    pub gender: GenderPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_experience: Option<i32>,
    #[serde(skip)]
    pub limit: Option<usize>,
}

fn is_any(gender: &GenderPreference) -> bool {
    !gender.is_explicit()
}

impl CustomCriteria {
    /// Drop blank values and filters outside their accepted range.
    /// Out-of-range filters are ignored rather than rejected.
    pub fn sanitized(self) -> Self {
        Self {
            skills: self
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            region: self
                .region
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            gender: self.gender,
            min_rating: self.min_rating.filter(|v| MIN_RATING_RANGE.contains(v)),
            max_age: self.max_age.filter(|v| MAX_AGE_RANGE.contains(v)),
            min_experience: self
                .min_experience
                .filter(|v| MIN_EXPERIENCE_RANGE.contains(v)),
            limit: self.limit,
        }
    }

    /// Number of criteria that shape the result (limit excluded).
    pub fn applied_count(&self) -> usize {
        [
            !self.skills.is_empty(),
            self.region.is_some(),
            self.gender.is_explicit(),
            self.min_rating.is_some(),
            self.max_age.is_some(),
            self.min_experience.is_some(),
        ]
        .into_iter()
        .filter(|applied| *applied)
        .count()
    }

    pub fn admits(&self, candidate: &Candidate) -> bool {
        // Unrated candidates count as 0 here, not as the neutral scoring default.
        let rating_ok = self
            .min_rating
            .is_none_or(|min| candidate.rating.unwrap_or(0.0) >= min);
        let age_ok = self.max_age.is_none_or(|max| candidate.age <= max);
        let experience_ok = self
            .min_experience
            .is_none_or(|min| candidate.experience_years >= min);

        rating_ok && age_ok && experience_ok
    }

    fn preferences(&self) -> Preferences {
        Preferences {
            required_skills: self.skills.clone(),
            gender: self.gender,
            region: self.region.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomRecommendations {
    pub recommendations: Vec<Recommendation>,
    pub criteria: CustomCriteria,
    pub filters_applied: usize,
}

pub fn recommend(
    scorer: &ContentScorer,
    criteria: &CustomCriteria,
    pool: &[Candidate],
    limit: usize,
) -> CustomRecommendations {
    let criteria = criteria.clone().sanitized();
    let filtered: Vec<Candidate> = pool
        .iter()
        .filter(|candidate| criteria.admits(candidate))
        .cloned()
        .collect();

    let recommendations = content::rank(scorer, &criteria.preferences(), &filtered, limit);

    CustomRecommendations {
        recommendations,
        filters_applied: criteria.applied_count(),
        criteria,
    }
}
