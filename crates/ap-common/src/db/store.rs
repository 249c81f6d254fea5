use async_trait::async_trait;

use crate::{
    Candidate, Requester,
    db::{
        AnalyticsStorageError, CandidateStorageError, FeedbackStorageError, PgPool,
        RatingStorageError, RecommendationLogError, RequesterStorageError, fetch_analytics_snapshot,
        fetch_available_candidates, fetch_candidate, fetch_positive_ratings, fetch_requester,
        fetch_similar_requesters, insert_feedback, insert_recommendation_log, upsert_rating,
    },
    store::{
        AnalyticsSnapshot, AnalyticsSource, CandidateStore, FeedbackReceipt, FeedbackSink,
        NewFeedback, NewRating, PositiveRating, PreferenceStore, RatingOutcome,
        RecommendationLogEntry, SimilarRequester, StoreError,
    },
};

/// Postgres-backed implementation of every store seam.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<CandidateStorageError> for StoreError {
    fn from(err: CandidateStorageError) -> Self {
        match err {
            CandidateStorageError::NotFound(id) => StoreError::CandidateNotFound(id),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<RequesterStorageError> for StoreError {
    fn from(err: RequesterStorageError) -> Self {
        match err {
            RequesterStorageError::NotFound(id) => StoreError::RequesterNotFound(id),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<RatingStorageError> for StoreError {
    fn from(err: RatingStorageError) -> Self {
        match err {
            RatingStorageError::CandidateNotFound(id) => StoreError::CandidateNotFound(id),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<RecommendationLogError> for StoreError {
    fn from(err: RecommendationLogError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<FeedbackStorageError> for StoreError {
    fn from(err: FeedbackStorageError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<AnalyticsStorageError> for StoreError {
    fn from(err: AnalyticsStorageError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn list_available(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(fetch_available_candidates(&self.pool).await?)
    }

    async fn get_by_id(&self, candidate_id: i64) -> Result<Candidate, StoreError> {
        Ok(fetch_candidate(&self.pool, candidate_id).await?)
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn get_requester(&self, requester_id: i64) -> Result<Requester, StoreError> {
        Ok(fetch_requester(&self.pool, requester_id).await?)
    }

    async fn list_similar_requesters(
        &self,
        requester_id: i64,
    ) -> Result<Vec<SimilarRequester>, StoreError> {
        Ok(fetch_similar_requesters(&self.pool, requester_id).await?)
    }

    async fn list_positive_ratings_for(
        &self,
        requester_id: i64,
    ) -> Result<Vec<PositiveRating>, StoreError> {
        Ok(fetch_positive_ratings(&self.pool, requester_id).await?)
    }
}

#[async_trait]
impl FeedbackSink for PgStore {
    async fn record_rating(&self, rating: &NewRating) -> Result<RatingOutcome, StoreError> {
        Ok(upsert_rating(&self.pool, rating).await?)
    }

    async fn record_recommendation_log(
        &self,
        entry: &RecommendationLogEntry,
    ) -> Result<(), StoreError> {
        Ok(insert_recommendation_log(&self.pool, entry).await?)
    }

    async fn record_feedback(
        &self,
        feedback: &NewFeedback,
    ) -> Result<FeedbackReceipt, StoreError> {
        Ok(insert_feedback(&self.pool, feedback).await?)
    }
}

#[async_trait]
impl AnalyticsSource for PgStore {
    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, StoreError> {
        Ok(fetch_analytics_snapshot(&self.pool).await?)
    }
}
