use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::Serialize;

use ap_common::api::{
    CustomQuery, CustomResponse, FeedbackRequest, RatingRequest, RecommendationQuery,
    RecommendationResponse, SimilarQuery, SimilarResponse, StatsResponse,
};
use ap_common::recommend::{RecommendOptions, custom::CustomCriteria};
use ap_common::store::{FeedbackReceipt, RatingOutcome};

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;

/// Success envelope shared by every recommendation route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.into()),
        })
    }
}

pub async fn recommend(
    State(state): State<SharedState>,
    auth: AuthUser,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RecommendationResponse>>, ApiError> {
    let requester_id = auth.require_parent("get recommendations")?;
    let Query(query) = query?;
    let options = RecommendOptions::try_from(query)?;

    let recommendations = state.engine.recommend(requester_id, &options).await?;
    let response = RecommendationResponse::new(requester_id, options.strategy, recommendations);

    let message = format!(
        "Found {} recommendations using {} algorithm",
        response.total_found, response.source
    );
    Ok(ApiResponse::with_message(response, message))
}

pub async fn similar(
    State(state): State<SharedState>,
    _auth: AuthUser,
    candidate_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<SimilarQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SimilarResponse>>, ApiError> {
    let Path(candidate_id) = candidate_id?;
    let Query(query) = query?;

    let similar = state
        .engine
        .similar_candidates(candidate_id, query.limit()?)
        .await?;

    Ok(ApiResponse::ok(SimilarResponse::new(candidate_id, similar)))
}

pub async fn rate(
    State(state): State<SharedState>,
    auth: AuthUser,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RatingOutcome>>, ApiError> {
    let requester_id = auth.require_parent("rate au pairs")?;
    let Json(payload) = payload?;

    let outcome = state
        .engine
        .rate(requester_id, payload.candidate_id, payload.score()?)
        .await?;

    Ok(ApiResponse::with_message(
        outcome,
        "Rating submitted successfully and model updated",
    ))
}

pub async fn custom(
    State(state): State<SharedState>,
    auth: AuthUser,
    query: Result<Query<CustomQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<CustomResponse>>, ApiError> {
    auth.require_parent("get custom recommendations")?;
    let Query(query) = query?;
    let criteria = CustomCriteria::from(query);

    let result = state.engine.custom(&criteria).await?;
    let response = CustomResponse::from(result);
    let message = format!(
        "Found {} au pairs matching your criteria",
        response.total_found
    );

    Ok(ApiResponse::with_message(response, message))
}

pub async fn feedback(
    State(state): State<SharedState>,
    auth: AuthUser,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<FeedbackReceipt>>, ApiError> {
    let requester_id = auth.require_parent("provide feedback")?;
    let Json(payload) = payload?;

    let receipt = state
        .engine
        .record_feedback(
            requester_id,
            payload.recommendation_ids,
            payload.feedback_type,
            payload.comments,
        )
        .await?;

    Ok(ApiResponse::with_message(
        receipt,
        "Feedback submitted successfully",
    ))
}

pub async fn stats(
    State(state): State<SharedState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    Ok(ApiResponse::ok(state.engine.stats().await?))
}
