//! Storage seams the recommendation engine reads from and writes to.
//!
//! `PgStore` (in `db`) is the production backend; `InMemoryStore` backs tests
//! and local runs without a database.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

use crate::{Candidate, Requester};

/// Weight given to every similar requester until a real preference distance exists.
// TODO: replace with a distance over gender, region and skill preferences.
pub const PLACEHOLDER_SIMILARITY: f64 = 0.85;

/// Ratings at or above this count as a positive signal.
pub const POSITIVE_RATING_MIN: i32 = 4;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("requester not found: {0}")]
    RequesterNotFound(i64),
    #[error("candidate not found: {0}")]
    CandidateNotFound(i64),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Another requester whose positive ratings feed collaborative scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarRequester {
    pub requester_id: i64,
    pub similarity_weight: f64,
}

/// A rating of 4 or 5 given by some requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveRating {
    pub candidate_id: i64,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub requester_id: i64,
    pub candidate_id: i64,
    pub score: i32,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub candidate_id: i64,
    pub average_rating: f64,
    pub total_ratings: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationLogEntry {
    pub requester_id: i64,
    pub strategy: String,
    pub count: i32,
    pub average_compatibility: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeedbackType {
    Helpful,
    NotHelpful,
    Irrelevant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub requester_id: i64,
    pub candidate_ids: Vec<i64>,
    pub feedback_type: FeedbackType,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub id: i64,
    pub requester_id: i64,
    pub feedback_type: FeedbackType,
    pub recommendation_count: usize,
}

/// Raw aggregates behind the statistics report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_recommendations: i64,
    pub successful_matches: i64,
    pub average_compatibility: Option<f64>,
    /// Free-text skill preferences of every requester.
    pub skill_preferences: Vec<String>,
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Available candidates in a stable order (ascending id).
    async fn list_available(&self) -> Result<Vec<Candidate>, StoreError>;

    async fn get_by_id(&self, candidate_id: i64) -> Result<Candidate, StoreError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_requester(&self, requester_id: i64) -> Result<Requester, StoreError>;

    /// Requesters other than `requester_id` with at least one positive rating.
    async fn list_similar_requesters(
        &self,
        requester_id: i64,
    ) -> Result<Vec<SimilarRequester>, StoreError>;

    async fn list_positive_ratings_for(
        &self,
        requester_id: i64,
    ) -> Result<Vec<PositiveRating>, StoreError>;
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Upsert the pair's rating and recompute the candidate aggregate atomically.
    async fn record_rating(&self, rating: &NewRating) -> Result<RatingOutcome, StoreError>;

    async fn record_recommendation_log(
        &self,
        entry: &RecommendationLogEntry,
    ) -> Result<(), StoreError>;

    async fn record_feedback(&self, feedback: &NewFeedback)
    -> Result<FeedbackReceipt, StoreError>;
}

#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, StoreError>;
}

/// A backend that serves every seam the engine needs.
pub trait RecommendationStore:
    CandidateStore + PreferenceStore + FeedbackSink + AnalyticsSource
{
}

impl<T> RecommendationStore for T where
    T: CandidateStore + PreferenceStore + FeedbackSink + AnalyticsSource
{
}
