use tracing::{debug, instrument};

use crate::{
    db::{PgPool, db_error, util::timed},
    store::{NewRating, RatingOutcome},
};

db_error!(RatingStorageError {
    #[error("candidate not found: {0}")]
    CandidateNotFound(i64),
});

/// Upsert one (requester, candidate) rating and refresh the candidate's
/// aggregate in the same transaction.
///
/// The candidate row is locked first, so concurrent raters of one candidate
/// run their read-aggregate-then-write sequence one after another.
#[instrument(skip(pool, rating), fields(requester_id = rating.requester_id, candidate_id = rating.candidate_id))]
pub async fn upsert_rating(
    pool: &PgPool,
    rating: &NewRating,
) -> Result<RatingOutcome, RatingStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let locked = timed(
        "candidates.lock_for_rating",
        tx.query_opt(
            "SELECT id FROM aupair.candidates WHERE id = $1 FOR UPDATE",
            &[&rating.candidate_id],
        ),
    )
    .await?;
    if locked.is_none() {
        return Err(RatingStorageError::CandidateNotFound(rating.candidate_id));
    }

    let upsert = tx
        .prepare_cached(
            "INSERT INTO aupair.ratings (requester_id, candidate_id, score, rated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (requester_id, candidate_id)
             DO UPDATE SET score = EXCLUDED.score, rated_at = EXCLUDED.rated_at",
        )
        .await?;
    timed(
        "ratings.upsert",
        tx.execute(
            &upsert,
            &[
                &rating.requester_id,
                &rating.candidate_id,
                &rating.score,
                &rating.rated_at,
            ],
        ),
    )
    .await?;

    let aggregate = timed(
        "ratings.aggregate",
        tx.query_one(
            "SELECT AVG(score)::DOUBLE PRECISION AS average_rating,
                    COUNT(*)::INTEGER AS total_ratings
             FROM aupair.ratings
             WHERE candidate_id = $1",
            &[&rating.candidate_id],
        ),
    )
    .await?;
    let average_rating: f64 = aggregate.try_get("average_rating")?;
    let total_ratings: i32 = aggregate.try_get("total_ratings")?;

    tx.execute(
        "UPDATE aupair.candidates SET rating = $1, total_ratings = $2 WHERE id = $3",
        &[&average_rating, &total_ratings, &rating.candidate_id],
    )
    .await?;

    tx.commit().await?;
    debug!(average_rating, total_ratings, "candidate aggregate refreshed");

    Ok(RatingOutcome {
        candidate_id: rating.candidate_id,
        average_rating,
        total_ratings,
    })
}
