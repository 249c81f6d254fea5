/// Declares a per-table storage error carrying the pool and driver failures
/// every query can hit, plus table-specific variants.
macro_rules! db_error {
    ($name:ident { $($variants:tt)* }) => {
        #[derive(Debug, thiserror::Error)]
        pub enum $name {
            #[error("failed to get postgres connection: {0}")]
            Pool(#[from] deadpool_postgres::PoolError),
            #[error("postgres error: {0}")]
            Postgres(#[from] tokio_postgres::Error),
            $($variants)*
        }
    };
}

pub(crate) use db_error;

pub mod candidates;
pub mod feedback;
pub mod migrations;
pub mod pool;
pub mod ratings;
pub mod recommendation_logs;
pub mod requesters;
pub mod stats;
pub mod store;
pub mod util;

pub use candidates::{CandidateStorageError, fetch_available_candidates, fetch_candidate};
pub use feedback::{FeedbackStorageError, insert_feedback};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPoolError, PgPool, create_pool_from_url};
pub use ratings::{RatingStorageError, upsert_rating};
pub use recommendation_logs::{RecommendationLogError, insert_recommendation_log};
pub use requesters::{
    RequesterStorageError, fetch_positive_ratings, fetch_requester, fetch_similar_requesters,
};
pub use stats::{AnalyticsStorageError, fetch_analytics_snapshot};
pub use store::PgStore;
