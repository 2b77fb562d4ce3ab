use axum::{extract::State, Json};
use tracing::info;

use tm_common::api::match_request::MatchRequest;
use tm_common::api::match_response::MatchResponse;
use tm_common::db::{
    fetch_employees, fetch_formula_by_version, fetch_latest_formula, insert_vacancy, VacancyInsert,
};
use tm_common::matching::MatchEngine;
use tm_common::run_id;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

const MAX_MATCH_LIMIT: usize = 500;

pub async fn run_match(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    if request.benchmark_ids.is_empty() {
        return Err(ApiError::BadRequest("benchmark_ids must not be empty".into()));
    }

    let formula = match &request.formula_version {
        Some(version) => fetch_formula_by_version(&state.pool, version).await?,
        None => fetch_latest_formula(&state.pool).await?,
    };
    let formula_version = formula.version.clone();

    // Employees load unfiltered; the engine applies the candidate filter so
    // benchmark members outside it still anchor the baseline.
    let employees = fetch_employees(&state.pool).await?;

    let engine = MatchEngine::new(formula).map_err(|err| ApiError::Internal(err.to_string()))?;
    let outcome = engine.score_pool(&employees, &request.benchmark_ids, &request.filter)?;

    let vacancy_id = if request.role_name.is_some()
        || request.job_level.is_some()
        || request.role_purpose.is_some()
    {
        let vacancy = VacancyInsert {
            role_name: request.role_name.clone(),
            job_level: request.job_level.clone(),
            role_purpose: request.role_purpose.clone(),
            benchmark_ids: request.benchmark_ids.clone(),
            formula_version: Some(formula_version.clone()),
            created_at: None,
        };
        Some(insert_vacancy(&state.pool, &vacancy).await?)
    } else {
        None
    };

    let limit = request
        .limit
        .unwrap_or(state.match_config.default_limit)
        .clamp(1, MAX_MATCH_LIMIT);

    info!(
        benchmark = request.benchmark_ids.len(),
        candidates = outcome.ranking.len(),
        formula_version = %formula_version,
        vacancy_id = vacancy_id.as_deref().unwrap_or(""),
        "scoring session served"
    );

    Ok(Json(MatchResponse::from_outcome(
        outcome,
        formula_version,
        vacancy_id,
        run_id::get().to_string(),
        limit,
        &state.match_config,
    )))
}
