use tracing::instrument;

use crate::{
    db::{PgPool, db_error, util::timed},
    store::{FeedbackReceipt, NewFeedback},
};

db_error!(FeedbackStorageError {
    #[error("feedback must reference at least one candidate")]
    Empty,
});

#[instrument(skip(pool, feedback), fields(requester_id = feedback.requester_id, count = feedback.candidate_ids.len()))]
pub async fn insert_feedback(
    pool: &PgPool,
    feedback: &NewFeedback,
) -> Result<FeedbackReceipt, FeedbackStorageError> {
    if feedback.candidate_ids.is_empty() {
        return Err(FeedbackStorageError::Empty);
    }

    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "INSERT INTO aupair.recommendation_feedback
                (requester_id, candidate_ids, feedback_type, comments, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .await?;

    let row = timed(
        "recommendation_feedback.insert",
        client.query_one(
            &stmt,
            &[
                &feedback.requester_id,
                &feedback.candidate_ids,
                &feedback.feedback_type.as_ref(),
                &feedback.comments,
                &feedback.created_at,
            ],
        ),
    )
    .await?;

    Ok(FeedbackReceipt {
        id: row.try_get("id")?,
        requester_id: feedback.requester_id,
        feedback_type: feedback.feedback_type,
        recommendation_count: feedback.candidate_ids.len(),
    })
}
