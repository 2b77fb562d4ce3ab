use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

/// Marker extractor: a handler taking `AuthUser` only runs for requests
/// carrying the configured API key.
#[derive(Debug, Clone)]
pub struct AuthUser;

fn provided_key(parts: &Parts) -> Option<&str> {
    if let Some(key) = parts.headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        let Some(expected) = config.api_key else {
            return Err(ApiError::Unauthorized("api key not configured".into()));
        };

        match provided_key(parts) {
            Some(key) if key == expected => Ok(AuthUser),
            _ => Err(ApiError::Unauthorized("invalid or missing api key".into())),
        }
    }
}
