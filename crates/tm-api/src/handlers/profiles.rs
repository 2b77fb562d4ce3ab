use axum::{extract::State, Json};
use tracing::info;

use tm_common::profile::{JobProfile, ProfileRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

pub async fn generate_profile(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<JobProfile>, ApiError> {
    if request.role_name.trim().is_empty()
        || request.job_level.trim().is_empty()
        || request.role_purpose.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "role_name, job_level and role_purpose are required".into(),
        ));
    }

    let profile = state.profiles.generate(&request).await?;

    info!(
        generator = state.profiles.name(),
        role_name = %request.role_name,
        "job profile generated"
    );

    Ok(Json(profile))
}
