//! Request and response bodies for the recommendation HTTP surface.

pub mod custom_query;
pub mod feedback_request;
pub mod rating_request;
pub mod recommendation_query;
pub mod recommendation_response;

pub use custom_query::CustomQuery;
pub use feedback_request::FeedbackRequest;
pub use rating_request::RatingRequest;
pub use recommendation_query::{RecommendationQuery, SimilarQuery};
pub use recommendation_response::{
    CustomResponse, RecommendationResponse, SimilarResponse, StatsResponse,
};
