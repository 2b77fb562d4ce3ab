use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::PgPool;
use crate::formula::{FormulaError, SuccessFormula};

#[derive(Debug, thiserror::Error)]
pub enum FormulaFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("success formula not found: {0}")]
    NotFound(String),
    #[error("failed to decode success formula: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("stored success formula is invalid: {0}")]
    Invalid(#[from] FormulaError),
}

/// Loads and validates a pinned formula version. Catalog-integrity problems
/// are fatal here; an invalid formula never reaches scoring.
#[instrument(skip(pool))]
pub async fn fetch_formula_by_version(
    pool: &PgPool,
    version: &str,
) -> Result<SuccessFormula, FormulaFetchError> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT definition FROM tm.success_formulas WHERE version = $1",
            &[&version],
        )
        .await?
        .ok_or_else(|| FormulaFetchError::NotFound(version.to_string()))?;

    decode(row.get("definition"))
}

/// Loads and validates the most recently stored formula.
#[instrument(skip(pool))]
pub async fn fetch_latest_formula(pool: &PgPool) -> Result<SuccessFormula, FormulaFetchError> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT definition FROM tm.success_formulas ORDER BY created_at DESC, version DESC LIMIT 1",
            &[],
        )
        .await?
        .ok_or_else(|| FormulaFetchError::NotFound("latest".to_string()))?;

    decode(row.get("definition"))
}

fn decode(definition: Value) -> Result<SuccessFormula, FormulaFetchError> {
    let formula: SuccessFormula = serde_json::from_value(definition)?;
    formula.validate()?;
    Ok(formula)
}
