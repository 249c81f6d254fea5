use super::{
    location::region_match,
    round_to_tenth,
    skills::check_required_skills,
    weights::{CONTENT_WEIGHTS, ContentWeights},
};
use crate::{Candidate, GenderPreference, Preferences};

const STRONG_SKILL_THRESHOLD: f64 = 0.5;
const SAME_REGION_THRESHOLD: f64 = 0.8;
const NEARBY_REGION_THRESHOLD: f64 = 0.5;
const HIGHLY_RATED: f64 = 4.5;
const EXPERIENCED_YEARS: i32 = 2;
const GENDER_MISMATCH_SCORE: f64 = 0.3;

/// One weighted factor with the explanation fragment it contributes, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    pub score: f64,
    pub explanation: Option<String>,
}

impl FactorScore {
    fn silent(score: f64) -> Self {
        Self {
            score,
            explanation: None,
        }
    }

    fn explained(score: f64, explanation: impl Into<String>) -> Self {
        Self {
            score,
            explanation: Some(explanation.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentScore {
    pub total: f64,
    pub skills: FactorScore,
    pub region: FactorScore,
    pub gender: FactorScore,
    pub rating: FactorScore,
    pub age: FactorScore,
    pub experience: FactorScore,
}

impl ContentScore {
    /// Weighted total scaled by 100, one decimal.
    pub fn compatibility(&self) -> f64 {
        round_to_tenth(self.total * 100.0)
    }

    pub fn explanation(&self) -> String {
        [
            &self.skills,
            &self.region,
            &self.gender,
            &self.rating,
            &self.age,
            &self.experience,
        ]
        .iter()
        .filter_map(|factor| factor.explanation.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone)]
pub struct ContentScorer {
    weights: ContentWeights,
}

impl Default for ContentScorer {
    fn default() -> Self {
        Self::new(CONTENT_WEIGHTS)
    }
}

impl ContentScorer {
    pub fn new(weights: ContentWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, prefs: &Preferences, candidate: &Candidate) -> ContentScore {
        let skills = self.score_skills(prefs, candidate);
        let region = self.score_region(prefs, candidate);
        let gender = self.score_gender(prefs, candidate);
        let rating = self.score_rating(candidate);
        let age = FactorScore::silent(age_score(candidate.age));
        let experience = self.score_experience(candidate);

        let w = self.weights;
        let total = skills.score * w.skills
            + region.score * w.region
            + gender.score * w.gender
            + rating.score * w.rating
            + age.score * w.age
            + experience.score * w.experience;

        ContentScore {
            total,
            skills,
            region,
            gender,
            rating,
            age,
            experience,
        }
    }

    fn score_skills(&self, prefs: &Preferences, candidate: &Candidate) -> FactorScore {
        let result = check_required_skills(&prefs.required_skills, &candidate.skills);
        let score = result.match_percentage;

        if score > STRONG_SKILL_THRESHOLD {
            FactorScore::explained(
                score,
                format!("Strong skill match ({:.0}%)", score * 100.0),
            )
        } else {
            FactorScore::silent(score)
        }
    }

    fn score_region(&self, prefs: &Preferences, candidate: &Candidate) -> FactorScore {
        let score = region_match(prefs.region.as_deref(), candidate.region.as_deref());

        if score > SAME_REGION_THRESHOLD {
            FactorScore::explained(score, "Same region")
        } else if score > NEARBY_REGION_THRESHOLD {
            FactorScore::explained(score, "Nearby region")
        } else {
            FactorScore::silent(score)
        }
    }

    fn score_gender(&self, prefs: &Preferences, candidate: &Candidate) -> FactorScore {
        let score = gender_match(prefs.gender, candidate);

        if score >= 1.0 && prefs.gender.is_explicit() {
            FactorScore::explained(score, "Matches gender preference")
        } else {
            FactorScore::silent(score)
        }
    }

    fn score_rating(&self, candidate: &Candidate) -> FactorScore {
        let score = candidate.rating_or_neutral() / 5.0;

        match candidate.rating {
            Some(rating) if rating >= HIGHLY_RATED => FactorScore::explained(score, "Highly rated"),
            _ => FactorScore::silent(score),
        }
    }

    fn score_experience(&self, candidate: &Candidate) -> FactorScore {
        let score = experience_score(candidate.experience_years);

        if candidate.experience_years >= EXPERIENCED_YEARS {
            FactorScore::explained(score, "Experienced")
        } else {
            FactorScore::silent(score)
        }
    }
}

pub fn gender_match(preference: GenderPreference, candidate: &Candidate) -> f64 {
    if preference.accepts(candidate.gender) {
        1.0
    } else {
        GENDER_MISMATCH_SCORE
    }
}

/// 18-25 is the preferred band, 16-30 acceptable.
pub fn age_score(age: i32) -> f64 {
    if (18..=25).contains(&age) {
        1.0
    } else if (16..=30).contains(&age) {
        0.8
    } else {
        0.5
    }
}

pub fn experience_score(years: i32) -> f64 {
    (f64::from(years.max(0)) / 3.0).min(1.0)
}
