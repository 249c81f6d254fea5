use std::str::FromStr;

use tokio_postgres::Row;
use tracing::instrument;

use crate::{
    GenderPreference, Requester,
    db::{PgPool, db_error, util::timed},
    store::{PLACEHOLDER_SIMILARITY, POSITIVE_RATING_MIN, PositiveRating, SimilarRequester},
};

db_error!(RequesterStorageError {
    #[error("requester not found: {0}")]
    NotFound(i64),
    #[error("failed to map requester row: {0}")]
    Mapping(String),
});

fn requester_from_row(row: &Row) -> Result<Requester, RequesterStorageError> {
    let id: i64 = row.try_get("id")?;
    let preference: String = row.try_get("preferred_gender")?;
    let preferred_gender = GenderPreference::from_str(&preference).map_err(|_| {
        RequesterStorageError::Mapping(format!(
            "requester {id} has unknown gender preference {preference:?}"
        ))
    })?;

    Ok(Requester {
        id,
        name: row.try_get("name")?,
        preferred_gender,
        skill_preference: row.try_get("skill_preference")?,
        region: row.try_get("region")?,
        child_age: row.try_get("child_age")?,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_requester(
    pool: &PgPool,
    requester_id: i64,
) -> Result<Requester, RequesterStorageError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "SELECT id, name, preferred_gender, skill_preference, region, child_age
             FROM aupair.requesters
             WHERE id = $1",
        )
        .await?;

    let row = timed("requesters.by_id", client.query_opt(&stmt, &[&requester_id]))
        .await?
        .ok_or(RequesterStorageError::NotFound(requester_id))?;

    requester_from_row(&row)
}

/// Other requesters with at least one positive rating, ascending by id.
#[instrument(skip(pool))]
pub async fn fetch_similar_requesters(
    pool: &PgPool,
    requester_id: i64,
) -> Result<Vec<SimilarRequester>, RequesterStorageError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "SELECT DISTINCT requester_id
             FROM aupair.ratings
             WHERE score >= $1 AND requester_id <> $2
             ORDER BY requester_id",
        )
        .await?;

    let rows = timed(
        "ratings.similar_requesters",
        client.query(&stmt, &[&POSITIVE_RATING_MIN, &requester_id]),
    )
    .await?;

    rows.iter()
        .map(|row| -> Result<SimilarRequester, RequesterStorageError> {
            Ok(SimilarRequester {
                requester_id: row.try_get("requester_id")?,
                similarity_weight: PLACEHOLDER_SIMILARITY,
            })
        })
        .collect()
}

#[instrument(skip(pool))]
pub async fn fetch_positive_ratings(
    pool: &PgPool,
    requester_id: i64,
) -> Result<Vec<PositiveRating>, RequesterStorageError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "SELECT candidate_id, score
             FROM aupair.ratings
             WHERE requester_id = $1 AND score >= $2
             ORDER BY candidate_id",
        )
        .await?;

    let rows = timed(
        "ratings.positive_for_requester",
        client.query(&stmt, &[&requester_id, &POSITIVE_RATING_MIN]),
    )
    .await?;

    rows.iter()
        .map(|row| -> Result<PositiveRating, RequesterStorageError> {
            Ok(PositiveRating {
                candidate_id: row.try_get("candidate_id")?,
                score: row.try_get("score")?,
            })
        })
        .collect()
}
