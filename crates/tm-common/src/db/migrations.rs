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

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "employees, scores, formulas and vacancies",
    sql: r#"
CREATE TABLE IF NOT EXISTS tm.employees (
    employee_id BIGINT PRIMARY KEY,
    fullname TEXT NOT NULL,
    directorate TEXT,
    "position" TEXT,
    grade TEXT
);

CREATE TABLE IF NOT EXISTS tm.employee_scores (
    employee_id BIGINT NOT NULL REFERENCES tm.employees(employee_id),
    tv_id TEXT NOT NULL,
    score_numeric DOUBLE PRECISION,
    score_text TEXT,
    PRIMARY KEY (employee_id, tv_id),
    CONSTRAINT chk_score_present CHECK (score_numeric IS NOT NULL OR score_text IS NOT NULL)
);

CREATE TABLE IF NOT EXISTS tm.success_formulas (
    version TEXT PRIMARY KEY,
    definition JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tm.talent_vacancies (
    vacancy_id TEXT PRIMARY KEY,
    role_name TEXT,
    job_level TEXT,
    role_purpose TEXT,
    benchmark_ids BIGINT[] NOT NULL,
    formula_version TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_employees_org
    ON tm.employees(directorate, "position", grade);
"#,
}];

/// Applies pending migrations, tracking them in `tm.schema_migrations`.
/// Safe to run on every startup.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let client = pool.get().await?;

    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS tm;\n\
             CREATE TABLE IF NOT EXISTS tm.schema_migrations (\n\
                 id INTEGER PRIMARY KEY,\n\
                 description TEXT NOT NULL,\n\
                 applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\n\
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let applied = client
            .query_opt(
                "SELECT 1 FROM tm.schema_migrations WHERE id = $1",
                &[&migration.id],
            )
            .await?;
        if applied.is_some() {
            continue;
        }

        client.batch_execute(migration.sql).await?;
        client
            .execute(
                "INSERT INTO tm.schema_migrations (id, description) VALUES ($1, $2)",
                &[&migration.id, &migration.description],
            )
            .await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
