use std::str::FromStr;

use serde::Deserialize;

use crate::{GenderPreference, recommend::custom::CustomCriteria};

/// Query string of `GET /api/recommendations/custom`.
///
/// Filters arrive as raw strings: a value that does not parse is ignored the
/// same way an out-of-range one is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomQuery {
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default, alias = "location")]
    pub region: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub min_rating: Option<String>,
    #[serde(default)]
    pub max_age: Option<String>,
    #[serde(default)]
    pub min_experience: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

fn lenient<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

impl From<CustomQuery> for CustomCriteria {
    fn from(query: CustomQuery) -> Self {
        let gender = query
            .gender
            .as_deref()
            .and_then(|value| GenderPreference::from_str(value.trim()).ok())
            .unwrap_or_default();

        CustomCriteria {
            skills: query
                .skills
                .as_deref()
                .map(|list| list.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            region: query.region,
            gender,
            min_rating: lenient(query.min_rating.as_deref()),
            max_age: lenient(query.max_age.as_deref()),
            min_experience: lenient(query.min_experience.as_deref()),
            limit: query.limit,
        }
        .sanitized()
    }
}
