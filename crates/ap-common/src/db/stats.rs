use tracing::instrument;

use crate::{
    db::{PgPool, db_error, util::timed},
    store::{AnalyticsSnapshot, POSITIVE_RATING_MIN},
};

db_error!(AnalyticsStorageError {});

#[instrument(skip(pool))]
pub async fn fetch_analytics_snapshot(
    pool: &PgPool,
) -> Result<AnalyticsSnapshot, AnalyticsStorageError> {
    let client = pool.get().await?;

    let logs = timed(
        "recommendation_logs.summary",
        client.query_one(
            "SELECT COUNT(*) AS total,
                    AVG(average_compatibility)::DOUBLE PRECISION AS average_compatibility
             FROM aupair.recommendation_logs",
            &[],
        ),
    )
    .await?;

    let successes = timed(
        "ratings.successful",
        client.query_one(
            "SELECT COUNT(*) AS total FROM aupair.ratings WHERE score >= $1",
            &[&POSITIVE_RATING_MIN],
        ),
    )
    .await?;

    let preferences = timed(
        "requesters.skill_preferences",
        client.query(
            "SELECT skill_preference FROM aupair.requesters WHERE skill_preference <> ''",
            &[],
        ),
    )
    .await?;

    Ok(AnalyticsSnapshot {
        total_recommendations: logs.try_get("total")?,
        successful_matches: successes.try_get("total")?,
        average_compatibility: logs.try_get("average_compatibility")?,
        skill_preferences: preferences
            .iter()
            .map(|row| row.try_get("skill_preference"))
            .collect::<Result<_, _>>()?,
    })
}
