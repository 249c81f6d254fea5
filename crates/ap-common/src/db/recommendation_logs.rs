use tracing::instrument;

use crate::{
    db::{PgPool, db_error, util::timed},
    store::RecommendationLogEntry,
};

db_error!(RecommendationLogError {});

#[instrument(skip(pool, entry), fields(requester_id = entry.requester_id, strategy = %entry.strategy))]
pub async fn insert_recommendation_log(
    pool: &PgPool,
    entry: &RecommendationLogEntry,
) -> Result<(), RecommendationLogError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "INSERT INTO aupair.recommendation_logs
                (requester_id, strategy, result_count, average_compatibility, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .await?;

    timed(
        "recommendation_logs.insert",
        client.execute(
            &stmt,
            &[
                &entry.requester_id,
                &entry.strategy,
                &entry.count,
                &entry.average_compatibility,
                &entry.created_at,
            ],
        ),
    )
    .await?;

    Ok(())
}
