use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    AnalyticsSnapshot, AnalyticsSource, CandidateStore, FeedbackReceipt, FeedbackSink,
    NewFeedback, NewRating, PLACEHOLDER_SIMILARITY, POSITIVE_RATING_MIN, PositiveRating,
    PreferenceStore, RatingOutcome, RecommendationLogEntry, SimilarRequester, StoreError,
};
use crate::{Candidate, Requester};

#[derive(Debug, Default)]
struct State {
    candidates: BTreeMap<i64, Candidate>,
    requesters: BTreeMap<i64, Requester>,
    /// Keyed by (requester_id, candidate_id); one effective rating per pair.
    ratings: BTreeMap<(i64, i64), i32>,
    logs: Vec<RecommendationLogEntry>,
    feedback: Vec<NewFeedback>,
}

impl State {
    fn recompute_aggregate(&mut self, candidate_id: i64) -> Option<RatingOutcome> {
        let scores: Vec<i32> = self
            .ratings
            .iter()
            .filter(|((_, cid), _)| *cid == candidate_id)
            .map(|(_, score)| *score)
            .collect();

        let candidate = self.candidates.get_mut(&candidate_id)?;
        let total = scores.len() as i32;
        let average = if scores.is_empty() {
            None
        } else {
            Some(f64::from(scores.iter().sum::<i32>()) / f64::from(total))
        };

        candidate.rating = average;
        candidate.total_ratings = total;

        Some(RatingOutcome {
            candidate_id,
            average_rating: average.unwrap_or_default(),
            total_ratings: total,
        })
    }
}

/// Process-local store. A single mutex serialises every rating write, which
/// keeps the aggregate recomputation atomic per candidate.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let state = self.state.get_mut();
        for candidate in candidates {
            state.candidates.insert(candidate.id, candidate);
        }
        self
    }

    pub fn with_requesters(mut self, requesters: impl IntoIterator<Item = Requester>) -> Self {
        let state = self.state.get_mut();
        for requester in requesters {
            state.requesters.insert(requester.id, requester);
        }
        self
    }

    /// Seed a rating; the candidate aggregate is recomputed as with `record_rating`.
    pub fn with_rating(mut self, requester_id: i64, candidate_id: i64, score: i32) -> Self {
        let state = self.state.get_mut();
        state.ratings.insert((requester_id, candidate_id), score);
        state.recompute_aggregate(candidate_id);
        self
    }

    pub async fn candidate(&self, candidate_id: i64) -> Option<Candidate> {
        self.state.lock().await.candidates.get(&candidate_id).cloned()
    }

    pub async fn recommendation_logs(&self) -> Vec<RecommendationLogEntry> {
        self.state.lock().await.logs.clone()
    }

    pub async fn feedback(&self) -> Vec<NewFeedback> {
        self.state.lock().await.feedback.clone()
    }

    pub async fn rating_count(&self) -> usize {
        self.state.lock().await.ratings.len()
    }
}

#[async_trait]
impl CandidateStore for InMemoryStore {
    async fn list_available(&self) -> Result<Vec<Candidate>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .candidates
            .values()
            .filter(|candidate| candidate.is_available)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, candidate_id: i64) -> Result<Candidate, StoreError> {
        self.state
            .lock()
            .await
            .candidates
            .get(&candidate_id)
            .cloned()
            .ok_or(StoreError::CandidateNotFound(candidate_id))
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStore {
    async fn get_requester(&self, requester_id: i64) -> Result<Requester, StoreError> {
        self.state
            .lock()
            .await
            .requesters
            .get(&requester_id)
            .cloned()
            .ok_or(StoreError::RequesterNotFound(requester_id))
    }

    async fn list_similar_requesters(
        &self,
        requester_id: i64,
    ) -> Result<Vec<SimilarRequester>, StoreError> {
        let state = self.state.lock().await;
        let raters: BTreeSet<i64> = state
            .ratings
            .iter()
            .filter(|((rid, _), score)| *rid != requester_id && **score >= POSITIVE_RATING_MIN)
            .map(|((rid, _), _)| *rid)
            .collect();

        Ok(raters
            .into_iter()
            .map(|id| SimilarRequester {
                requester_id: id,
                similarity_weight: PLACEHOLDER_SIMILARITY,
            })
            .collect())
    }

    async fn list_positive_ratings_for(
        &self,
        requester_id: i64,
    ) -> Result<Vec<PositiveRating>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .ratings
            .iter()
            .filter(|((rid, _), score)| *rid == requester_id && **score >= POSITIVE_RATING_MIN)
            .map(|((_, cid), score)| PositiveRating {
                candidate_id: *cid,
                score: *score,
            })
            .collect())
    }
}

#[async_trait]
impl FeedbackSink for InMemoryStore {
    async fn record_rating(&self, rating: &NewRating) -> Result<RatingOutcome, StoreError> {
        let mut state = self.state.lock().await;
        if !state.candidates.contains_key(&rating.candidate_id) {
            return Err(StoreError::CandidateNotFound(rating.candidate_id));
        }

        state
            .ratings
            .insert((rating.requester_id, rating.candidate_id), rating.score);
        state
            .recompute_aggregate(rating.candidate_id)
            .ok_or(StoreError::CandidateNotFound(rating.candidate_id))
    }

    async fn record_recommendation_log(
        &self,
        entry: &RecommendationLogEntry,
    ) -> Result<(), StoreError> {
        self.state.lock().await.logs.push(entry.clone());
        Ok(())
    }

    async fn record_feedback(
        &self,
        feedback: &NewFeedback,
    ) -> Result<FeedbackReceipt, StoreError> {
        let mut state = self.state.lock().await;
        state.feedback.push(feedback.clone());

        Ok(FeedbackReceipt {
            id: state.feedback.len() as i64,
            requester_id: feedback.requester_id,
            feedback_type: feedback.feedback_type,
            recommendation_count: feedback.candidate_ids.len(),
        })
    }
}

#[async_trait]
impl AnalyticsSource for InMemoryStore {
    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, StoreError> {
        let state = self.state.lock().await;

        let logged: Vec<f64> = state
            .logs
            .iter()
            .filter_map(|entry| entry.average_compatibility)
            .collect();
        let average_compatibility = if logged.is_empty() {
            None
        } else {
            Some(logged.iter().sum::<f64>() / logged.len() as f64)
        };

        Ok(AnalyticsSnapshot {
            total_recommendations: state.logs.len() as i64,
            successful_matches: state
                .ratings
                .values()
                .filter(|score| **score >= POSITIVE_RATING_MIN)
                .count() as i64,
            average_compatibility,
            skill_preferences: state
                .requesters
                .values()
                .map(|requester| requester.skill_preference.clone())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gender;
    use chrono::Utc;
    use std::sync::Arc;

    fn candidate(id: i64) -> Candidate {
        Candidate {
            id,
            name: format!("candidate-{id}"),
            age: 21,
            gender: Gender::Female,
            region: None,
            skills: BTreeSet::new(),
            bio: String::new(),
            rating: None,
            total_ratings: 0,
            experience_years: 0,
            is_available: true,
        }
    }

    fn rating(requester_id: i64, candidate_id: i64, score: i32) -> NewRating {
        NewRating {
            requester_id,
            candidate_id,
            score,
            rated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn aggregate_is_mean_of_stored_ratings() {
        let store = InMemoryStore::new().with_candidates([candidate(1)]);

        store.record_rating(&rating(10, 1, 4)).await.unwrap();
        let outcome = store.record_rating(&rating(11, 1, 2)).await.unwrap();

        assert_eq!(outcome.average_rating, 3.0);
        assert_eq!(outcome.total_ratings, 2);
        assert_eq!(store.candidate(1).await.unwrap().rating, Some(3.0));
    }

    #[tokio::test]
    async fn later_rating_replaces_earlier_for_same_pair() {
        let store = InMemoryStore::new().with_candidates([candidate(1)]);

        store.record_rating(&rating(10, 1, 1)).await.unwrap();
        let outcome = store.record_rating(&rating(10, 1, 5)).await.unwrap();

        assert_eq!(outcome.average_rating, 5.0);
        assert_eq!(outcome.total_ratings, 1);
    }

    #[tokio::test]
    async fn rating_unknown_candidate_writes_nothing() {
        let store = InMemoryStore::new();
        let err = store.record_rating(&rating(10, 99, 4)).await.unwrap_err();

        assert!(matches!(err, StoreError::CandidateNotFound(99)));
        assert_eq!(store.rating_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_raters_do_not_lose_updates() {
        let store = Arc::new(InMemoryStore::new().with_candidates([candidate(1)]));

        let handles: Vec<_> = (0..20)
            .map(|requester| {
                let store = Arc::clone(&store);
                let score = if requester % 2 == 0 { 5 } else { 1 };
                tokio::spawn(async move { store.record_rating(&rating(requester, 1, score)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.candidate(1).await.unwrap();
        assert_eq!(stored.total_ratings, 20);
        assert_eq!(stored.rating, Some(3.0));
    }

    #[tokio::test]
    async fn similar_requesters_exclude_self_and_negative_raters() {
        let store = InMemoryStore::new()
            .with_candidates([candidate(1), candidate(2)])
            .with_rating(10, 1, 5)
            .with_rating(11, 1, 2)
            .with_rating(12, 2, 4);

        let similar = store.list_similar_requesters(12).await.unwrap();
        let ids: Vec<i64> = similar.iter().map(|s| s.requester_id).collect();

        assert_eq!(ids, vec![10]);
        assert!(similar
            .iter()
            .all(|s| (0.7..1.0).contains(&s.similarity_weight)));
    }
}
