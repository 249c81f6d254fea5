use std::str::FromStr;

use serde::Deserialize;

use crate::recommend::{RecommendError, RecommendOptions, Strategy};

/// Query string of `GET /api/recommendations`.
///
/// Values stay raw so a malformed one becomes `InvalidArgument` instead of an
/// extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default, alias = "algorithm")]
    pub strategy: Option<String>,
    #[serde(default, alias = "useExternalModel")]
    pub use_external_model: Option<String>,
}

/// Blank values count as absent.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, RecommendError> {
    present(raw)
        .map(|value| {
            value.parse::<usize>().map_err(|_| {
                RecommendError::InvalidArgument(format!("limit must be a positive integer, got {value:?}"))
            })
        })
        .transpose()
}

impl TryFrom<RecommendationQuery> for RecommendOptions {
    type Error = RecommendError;

    fn try_from(query: RecommendationQuery) -> Result<Self, Self::Error> {
        let defaults = RecommendOptions::default();

        let strategy = present(query.strategy.as_deref())
            .map(|value| {
                Strategy::from_str(value).map_err(|_| {
                    RecommendError::InvalidArgument(
                        "strategy must be one of content, collaborative, hybrid".into(),
                    )
                })
            })
            .transpose()?
            .unwrap_or(defaults.strategy);

        let use_external_model = present(query.use_external_model.as_deref())
            .map(|value| {
                value.to_ascii_lowercase().parse::<bool>().map_err(|_| {
                    RecommendError::InvalidArgument("use_external_model must be true or false".into())
                })
            })
            .transpose()?
            .unwrap_or(defaults.use_external_model);

        Ok(Self {
            limit: parse_limit(query.limit.as_deref())?,
            strategy,
            use_external_model,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl SimilarQuery {
    pub fn limit(&self) -> Result<Option<usize>, RecommendError> {
        parse_limit(self.limit.as_deref())
    }
}
