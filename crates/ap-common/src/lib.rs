pub mod api;
pub mod db;
pub mod logging;
pub mod matching;
pub mod recommend;
pub mod store;
pub mod telemetry;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use matching::skills::{Skill, parse_skill_tokens};

/// Rating assumed for candidates nobody has rated yet.
pub const NEUTRAL_RATING: f64 = 4.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GenderPreference {
    #[default]
    Any,
    Male,
    Female,
}

impl GenderPreference {
    pub fn is_explicit(&self) -> bool {
        !matches!(self, GenderPreference::Any)
    }

    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            GenderPreference::Any => true,
            GenderPreference::Male => gender == Gender::Male,
            GenderPreference::Female => gender == Gender::Female,
        }
    }
}

/// An au pair profile offered by a partner orphanage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub region: Option<String>,
    pub skills: BTreeSet<Skill>,
    #[serde(default)]
    pub bio: String,
    /// Mean of all stored ratings; `None` until the first rating arrives.
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_ratings: i32,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Candidate {
    pub fn rating_or_neutral(&self) -> f64 {
        self.rating.unwrap_or(NEUTRAL_RATING)
    }
}

/// A parent account looking for an au pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub id: i64,
    pub name: String,
    pub preferred_gender: GenderPreference,
    /// Free text as typed by the parent, e.g. "cooking, first aid".
    pub skill_preference: String,
    pub region: Option<String>,
    pub child_age: Option<i32>,
}

/// Requester preferences in the shape the scorers consume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub required_skills: Vec<String>,
    pub gender: GenderPreference,
    pub region: Option<String>,
}

impl From<&Requester> for Preferences {
    fn from(requester: &Requester) -> Self {
        Self {
            required_skills: parse_skill_tokens(&requester.skill_preference),
            gender: requester.preferred_gender,
            region: requester.region.clone(),
        }
    }
}
