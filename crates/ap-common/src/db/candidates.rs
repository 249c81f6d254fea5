use std::str::FromStr;

use tokio_postgres::Row;
use tracing::{instrument, warn};

use crate::{
    Candidate, Gender,
    db::{PgPool, db_error, util::timed},
    matching::skills::Skill,
};

db_error!(CandidateStorageError {
    #[error("candidate not found: {0}")]
    NotFound(i64),
    #[error("failed to map candidate row: {0}")]
    Mapping(String),
});

pub(crate) const CANDIDATE_COLUMNS: &str = "id, name, age, gender, region, skills, bio, rating, \
     total_ratings, experience_years, is_available";

/// Unknown skill labels are dropped with a warning instead of failing the row.
fn parse_skills(candidate_id: i64, raw: Vec<String>) -> std::collections::BTreeSet<Skill> {
    raw.into_iter()
        .filter_map(|label| {
            let skill = Skill::from_label_lenient(&label);
            if skill.is_none() {
                warn!(candidate_id, label = %label, "ignoring unknown skill label");
            }
            skill
        })
        .collect()
}

pub(crate) fn candidate_from_row(row: &Row) -> Result<Candidate, CandidateStorageError> {
    let id: i64 = row.try_get("id")?;
    let gender_raw: String = row.try_get("gender")?;
    let gender = Gender::from_str(&gender_raw).map_err(|_| {
        CandidateStorageError::Mapping(format!("candidate {id} has unknown gender {gender_raw:?}"))
    })?;

    Ok(Candidate {
        id,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender,
        region: row.try_get("region")?,
        skills: parse_skills(id, row.try_get("skills")?),
        bio: row.try_get("bio")?,
        rating: row.try_get("rating")?,
        total_ratings: row.try_get("total_ratings")?,
        experience_years: row.try_get("experience_years")?,
        is_available: row.try_get("is_available")?,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_available_candidates(
    pool: &PgPool,
) -> Result<Vec<Candidate>, CandidateStorageError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM aupair.candidates WHERE is_available ORDER BY id"
        ))
        .await?;

    let rows = timed("candidates.available", client.query(&stmt, &[])).await?;
    rows.iter().map(candidate_from_row).collect()
}

#[instrument(skip(pool))]
pub async fn fetch_candidate(
    pool: &PgPool,
    candidate_id: i64,
) -> Result<Candidate, CandidateStorageError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM aupair.candidates WHERE id = $1"
        ))
        .await?;

    let row = timed("candidates.by_id", client.query_opt(&stmt, &[&candidate_id]))
        .await?
        .ok_or(CandidateStorageError::NotFound(candidate_id))?;

    candidate_from_row(&row)
}
