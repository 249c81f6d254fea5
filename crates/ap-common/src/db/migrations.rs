use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "requesters, candidates and ratings",
        sql: r#"
CREATE TABLE IF NOT EXISTS aupair.requesters (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    preferred_gender TEXT NOT NULL DEFAULT 'any'
        CHECK (preferred_gender IN ('male', 'female', 'any')),
    skill_preference TEXT NOT NULL DEFAULT '',
    region TEXT,
    child_age INTEGER CHECK (child_age IS NULL OR child_age >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS aupair.candidates (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL CHECK (gender IN ('male', 'female')),
    region TEXT,
    skills TEXT[] NOT NULL DEFAULT '{}',
    bio TEXT NOT NULL DEFAULT '',
    rating DOUBLE PRECISION CHECK (rating IS NULL OR (rating >= 0.0 AND rating <= 5.0)),
    total_ratings INTEGER NOT NULL DEFAULT 0,
    experience_years INTEGER NOT NULL DEFAULT 0 CHECK (experience_years >= 0),
    is_available BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_candidates_available
    ON aupair.candidates(id)
    WHERE is_available;

CREATE TABLE IF NOT EXISTS aupair.ratings (
    requester_id BIGINT NOT NULL REFERENCES aupair.requesters(id) ON DELETE CASCADE,
    candidate_id BIGINT NOT NULL REFERENCES aupair.candidates(id) ON DELETE CASCADE,
    score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
    rated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (requester_id, candidate_id)
);

CREATE INDEX IF NOT EXISTS idx_ratings_candidate
    ON aupair.ratings(candidate_id);
CREATE INDEX IF NOT EXISTS idx_ratings_positive
    ON aupair.ratings(requester_id)
    WHERE score >= 4;
"#,
    },
    Migration {
        id: 2,
        description: "recommendation logs and feedback",
        sql: r#"
CREATE TABLE IF NOT EXISTS aupair.recommendation_logs (
    id BIGSERIAL PRIMARY KEY,
    requester_id BIGINT NOT NULL,
    strategy TEXT NOT NULL,
    result_count INTEGER NOT NULL CHECK (result_count >= 0),
    average_compatibility DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_recommendation_logs_created
    ON aupair.recommendation_logs(created_at);

CREATE TABLE IF NOT EXISTS aupair.recommendation_feedback (
    id BIGSERIAL PRIMARY KEY,
    requester_id BIGINT NOT NULL,
    candidate_ids BIGINT[] NOT NULL CHECK (cardinality(candidate_ids) > 0),
    feedback_type TEXT NOT NULL
        CHECK (feedback_type IN ('helpful', 'not_helpful', 'irrelevant')),
    comments TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#,
    },
];

/// Apply pending migrations in order, each in its own transaction.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS aupair;
             CREATE TABLE IF NOT EXISTS aupair.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM aupair.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO aupair.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
