pub mod collaborative;
pub mod content;
pub mod custom;
pub mod external;
pub mod hybrid;
pub mod stats;

use std::{cmp::Ordering, fmt, str::FromStr, sync::Arc, time::Duration};

use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    Candidate, Preferences, Requester,
    matching::{round_to_tenth, scoring::ContentScorer, similarity::candidate_similarity},
    store::{
        AnalyticsSource, CandidateStore, FeedbackReceipt, FeedbackSink, FeedbackType,
        NewFeedback, NewRating, PreferenceStore, RatingOutcome, RecommendationLogEntry,
        RecommendationStore, StoreError,
    },
    telemetry,
};
use custom::{CustomCriteria, CustomRecommendations};
use external::{ExternalScoreRequest, ExternalScorer};
use stats::RecommendationStats;

pub const MIN_RATING_SCORE: i32 = 1;
pub const MAX_RATING_SCORE: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub similar_default_limit: usize,
    pub similar_max_limit: usize,
    pub external_timeout: Duration,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            similar_default_limit: 5,
            similar_max_limit: 20,
            external_timeout: Duration::from_secs(30),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

impl RecommendConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            default_limit: env_or("AP_RECOMMEND_DEFAULT_LIMIT", defaults.default_limit),
            max_limit: env_or("AP_RECOMMEND_MAX_LIMIT", defaults.max_limit),
            similar_default_limit: env_or(
                "AP_RECOMMEND_SIMILAR_DEFAULT_LIMIT",
                defaults.similar_default_limit,
            ),
            similar_max_limit: env_or("AP_RECOMMEND_SIMILAR_MAX_LIMIT", defaults.similar_max_limit),
            external_timeout: Duration::from_secs(env_or(
                "AP_RECOMMEND_EXTERNAL_TIMEOUT_SECS",
                defaults.external_timeout.as_secs(),
            )),
        };

        // A default outside its own range would make every bare request invalid.
        if config.max_limit == 0
            || !(1..=config.max_limit).contains(&config.default_limit)
            || config.similar_max_limit == 0
            || !(1..=config.similar_max_limit).contains(&config.similar_default_limit)
        {
            warn!(?config, "inconsistent recommendation limits in env; using defaults");
            return Self {
                external_timeout: config.external_timeout,
                ..defaults
            };
        }

        config
    }
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
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Strategy {
    Content,
    Collaborative,
    #[default]
    Hybrid,
}

/// Which path produced a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MatchType {
    ContentBased,
    Collaborative,
    Hybrid,
    /// Delegated to the external model; carries the algorithm it reported.
    External(String),
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::ContentBased => f.write_str("content-based"),
            MatchType::Collaborative => f.write_str("collaborative"),
            MatchType::Hybrid => f.write_str("hybrid"),
            MatchType::External(algorithm) => write!(f, "ml-{algorithm}"),
        }
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content-based" => Ok(MatchType::ContentBased),
            "collaborative" => Ok(MatchType::Collaborative),
            "hybrid" => Ok(MatchType::Hybrid),
            other => match other.strip_prefix("ml-") {
                Some(algorithm) if !algorithm.is_empty() => {
                    Ok(MatchType::External(algorithm.to_string()))
                }
                _ => Err(format!("unknown match type: {other}")),
            },
        }
    }
}

impl From<MatchType> for String {
    fn from(value: MatchType) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MatchType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub compatibility_score: f64,
    pub match_explanation: String,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    pub limit: Option<usize>,
    pub strategy: Strategy,
    pub use_external_model: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            limit: None,
            strategy: Strategy::default(),
            use_external_model: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("requester not found: {0}")]
    RequesterNotFound(i64),
    #[error("candidate not found: {0}")]
    CandidateNotFound(i64),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for RecommendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RequesterNotFound(id) => RecommendError::RequesterNotFound(id),
            StoreError::CandidateNotFound(id) => RecommendError::CandidateNotFound(id),
            StoreError::Backend(message) => RecommendError::Storage(message),
        }
    }
}

/// Stable descending sort by score; equal scores keep their input order.
pub(crate) fn sort_by_score_desc<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
}

fn validate_limit(limit: Option<usize>, default: usize, max: usize) -> Result<usize, RecommendError> {
    let limit = limit.unwrap_or(default);
    if (1..=max).contains(&limit) {
        Ok(limit)
    } else {
        Err(RecommendError::InvalidArgument(format!(
            "limit must be between 1 and {max}"
        )))
    }
}

#[derive(Clone)]
pub struct RecommendationEngine {
    candidates: Arc<dyn CandidateStore>,
    preferences: Arc<dyn PreferenceStore>,
    feedback: Arc<dyn FeedbackSink>,
    analytics: Arc<dyn AnalyticsSource>,
    external: Option<Arc<dyn ExternalScorer>>,
    scorer: ContentScorer,
    config: RecommendConfig,
}

impl fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("config", &self.config)
            .field("external", &self.external.is_some())
            .finish_non_exhaustive()
    }
}

impl RecommendationEngine {
    pub fn new<S>(store: Arc<S>, config: RecommendConfig) -> Self
    where
        S: RecommendationStore + 'static,
    {
        Self::from_parts(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            config,
        )
    }

    pub fn from_parts(
        candidates: Arc<dyn CandidateStore>,
        preferences: Arc<dyn PreferenceStore>,
        feedback: Arc<dyn FeedbackSink>,
        analytics: Arc<dyn AnalyticsSource>,
        config: RecommendConfig,
    ) -> Self {
        Self {
            candidates,
            preferences,
            feedback,
            analytics,
            external: None,
            scorer: ContentScorer::default(),
            config,
        }
    }

    pub fn with_external_scorer(mut self, scorer: Arc<dyn ExternalScorer>) -> Self {
        self.external = Some(scorer);
        self
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Ranked, explained recommendations for one requester.
    #[instrument(skip(self, options), fields(strategy = %options.strategy))]
    pub async fn recommend(
        &self,
        requester_id: i64,
        options: &RecommendOptions,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let limit = validate_limit(options.limit, self.config.default_limit, self.config.max_limit)?;
        let requester = self.preferences.get_requester(requester_id).await?;
        let prefs = Preferences::from(&requester);

        let delegated = if options.use_external_model {
            self.try_external(&requester, options.strategy, limit).await
        } else {
            None
        };

        let (results, used) = match delegated {
            Some(results) => (results, format!("ml-{}", options.strategy)),
            None => (
                self.run_local(requester_id, &prefs, options.strategy, limit)
                    .await?,
                options.strategy.to_string(),
            ),
        };

        counter!(telemetry::RECOMMENDATIONS_TOTAL, "strategy" => used.clone()).increment(1);
        info!(requester_id, strategy = %used, count = results.len(), "recommendations served");
        self.log_recommendation(requester_id, used, &results).await;

        Ok(results)
    }

    async fn run_local(
        &self,
        requester_id: i64,
        prefs: &Preferences,
        strategy: Strategy,
        limit: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let pool = self.candidates.list_available().await?;

        match strategy {
            Strategy::Content => Ok(content::rank(&self.scorer, prefs, &pool, limit)),
            Strategy::Collaborative => self.collaborative(requester_id, &pool, limit).await,
            Strategy::Hybrid => {
                let widened = limit.saturating_mul(2);
                let content = content::rank(&self.scorer, prefs, &pool, widened);

                match self.collaborative(requester_id, &pool, widened).await {
                    Ok(collaborative) => Ok(hybrid::blend(content, collaborative, limit)),
                    Err(err) => {
                        warn!(requester_id, error = %err, "collaborative scoring failed; serving content-based results");
                        let mut content = content;
                        content.truncate(limit);
                        Ok(content)
                    }
                }
            }
        }
    }

    async fn collaborative(
        &self,
        requester_id: i64,
        pool: &[Candidate],
        limit: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let similar = self.preferences.list_similar_requesters(requester_id).await?;

        let mut signals = Vec::with_capacity(similar.len());
        for requester in similar {
            let ratings = self
                .preferences
                .list_positive_ratings_for(requester.requester_id)
                .await?;
            signals.push((requester, ratings));
        }

        Ok(collaborative::rank(&signals, pool, limit))
    }

    async fn try_external(
        &self,
        requester: &Requester,
        strategy: Strategy,
        limit: usize,
    ) -> Option<Vec<Recommendation>> {
        let scorer = self.external.as_ref()?;
        let request = ExternalScoreRequest::new(requester, strategy, limit);

        let reason = match tokio::time::timeout(self.config.external_timeout, scorer.try_score(&request)).await {
            Ok(Ok(mut results)) if !results.is_empty() => {
                sort_by_score_desc(&mut results, |r| r.compatibility_score);
                results.truncate(limit);
                return Some(results);
            }
            Ok(Ok(_)) => {
                warn!(requester_id = requester.id, "external model returned no recommendations; using local strategy");
                "empty"
            }
            Ok(Err(err)) => {
                warn!(requester_id = requester.id, error = %err, "external model failed; using local strategy");
                err.reason()
            }
            Err(_) => {
                warn!(
                    requester_id = requester.id,
                    timeout_secs = self.config.external_timeout.as_secs(),
                    "external model timed out; using local strategy"
                );
                "timeout"
            }
        };

        counter!(telemetry::EXTERNAL_FALLBACKS_TOTAL, "reason" => reason).increment(1);
        None
    }

    async fn log_recommendation(&self, requester_id: i64, strategy: String, results: &[Recommendation]) {
        let average_compatibility = if results.is_empty() {
            None
        } else {
            let sum: f64 = results.iter().map(|r| r.compatibility_score).sum();
            Some(round_to_tenth(sum / results.len() as f64))
        };

        let entry = RecommendationLogEntry {
            requester_id,
            strategy,
            count: i32::try_from(results.len()).unwrap_or(i32::MAX),
            average_compatibility,
            created_at: Utc::now(),
        };

        if let Err(err) = self.feedback.record_recommendation_log(&entry).await {
            warn!(requester_id, error = %err, "failed to write recommendation log");
        }
    }

    /// "More like this" for a candidate profile; not personalised.
    #[instrument(skip(self))]
    pub async fn similar_candidates(
        &self,
        candidate_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<SimilarCandidate>, RecommendError> {
        let limit = validate_limit(
            limit,
            self.config.similar_default_limit,
            self.config.similar_max_limit,
        )?;
        let reference = self.candidates.get_by_id(candidate_id).await?;

        let mut similar: Vec<SimilarCandidate> = self
            .candidates
            .list_available()
            .await?
            .into_iter()
            .filter(|candidate| candidate.id != reference.id)
            .map(|candidate| SimilarCandidate {
                similarity_score: candidate_similarity(&reference, &candidate),
                candidate,
            })
            .collect();

        sort_by_score_desc(&mut similar, |s| s.similarity_score);
        similar.truncate(limit);
        Ok(similar)
    }

    /// Store a requester's rating and refresh the candidate aggregate.
    #[instrument(skip(self))]
    pub async fn rate(
        &self,
        requester_id: i64,
        candidate_id: i64,
        score: i32,
    ) -> Result<RatingOutcome, RecommendError> {
        if !(MIN_RATING_SCORE..=MAX_RATING_SCORE).contains(&score) {
            return Err(RecommendError::InvalidArgument(format!(
                "rating must be between {MIN_RATING_SCORE} and {MAX_RATING_SCORE}"
            )));
        }

        let outcome = self
            .feedback
            .record_rating(&NewRating {
                requester_id,
                candidate_id,
                score,
                rated_at: Utc::now(),
            })
            .await?;

        counter!(telemetry::RATINGS_TOTAL).increment(1);
        info!(
            requester_id,
            candidate_id,
            average_rating = outcome.average_rating,
            total_ratings = outcome.total_ratings,
            "rating recorded"
        );
        Ok(outcome)
    }

    #[instrument(skip(self, candidate_ids, comments), fields(count = candidate_ids.len()))]
    pub async fn record_feedback(
        &self,
        requester_id: i64,
        candidate_ids: Vec<i64>,
        feedback_type: FeedbackType,
        comments: Option<String>,
    ) -> Result<FeedbackReceipt, RecommendError> {
        if candidate_ids.is_empty() {
            return Err(RecommendError::InvalidArgument(
                "recommendation ids must not be empty".into(),
            ));
        }

        let feedback = NewFeedback {
            requester_id,
            candidate_ids,
            feedback_type,
            comments: comments
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        };

        Ok(self.feedback.record_feedback(&feedback).await?)
    }

    /// Content-based ranking over an ad hoc filter set instead of a stored profile.
    #[instrument(skip(self))]
    pub async fn custom(
        &self,
        criteria: &CustomCriteria,
    ) -> Result<CustomRecommendations, RecommendError> {
        let limit = validate_limit(criteria.limit, self.config.default_limit, self.config.max_limit)?;
        let pool = self.candidates.list_available().await?;

        Ok(custom::recommend(&self.scorer, criteria, &pool, limit))
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<RecommendationStats, RecommendError> {
        let snapshot = self.analytics.analytics_snapshot().await?;
        Ok(stats::summarize(&snapshot))
    }
}
