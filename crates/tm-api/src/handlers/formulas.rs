use axum::{
    extract::{Path, State},
    Json,
};

use tm_common::db::fetch_formula_by_version;
use tm_common::formula::SuccessFormula;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

pub async fn get_formula(
    State(state): State<SharedState>,
    Path(version): Path<String>,
    _auth: AuthUser,
) -> Result<Json<SuccessFormula>, ApiError> {
    let formula = fetch_formula_by_version(&state.pool, &version).await?;
    Ok(Json(formula))
}
