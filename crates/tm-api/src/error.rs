use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::{borrow::Cow, future::Future};
use thiserror::Error;
use tracing::error;

use tm_common::db::{
    EmployeeFetchError, FormulaFetchError, MigrationError, VacancyStorageError,
};
use tm_common::matching::EngineError;
use tm_common::profile::ProfileError;

tokio::task_local! {
    static REQUEST_ID: String;
}

fn sanitize_message(message: &str) -> String {
    const MAX_LEN: usize = 240;

    let mut cleaned = message
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .replace(['\n', '\r'], " ");

    cleaned = cleaned
        .split_whitespace()
        .map(|token| {
            if token.contains("://") {
                "[redacted-url]".to_string()
            } else if token.starts_with('/') || token.contains('\\') {
                "[redacted-path]".to_string()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.len() > MAX_LEN {
        cleaned.truncate(MAX_LEN);
        cleaned.push('…');
    }

    if cleaned.trim().is_empty() {
        "unexpected error".to_string()
    } else {
        cleaned
    }
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    if let Some(request_id) = request_id {
        REQUEST_ID.scope(request_id, fut).await
    } else {
        fut.await
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let request_id = current_request_id();

        error!(
            code,
            status = %status,
            request_id = request_id.as_deref().unwrap_or(""),
            error = %self,
            "api_error"
        );

        let body = Json(ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            ApiError::BadRequest(msg) => Cow::Owned(sanitize_message(msg)),
            ApiError::Unauthorized(_) => Cow::Borrowed("unauthorized"),
            ApiError::NotFound(msg) => Cow::Owned(sanitize_message(msg)),
            ApiError::ServiceUnavailable(_) => Cow::Borrowed("service unavailable"),
            ApiError::Database(_) | ApiError::Internal(_) => Cow::Borrowed("internal server error"),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::EmptyBenchmark => {
                ApiError::BadRequest("benchmark_ids must not be empty".into())
            }
            EngineError::UnknownEmployee(id) => {
                ApiError::BadRequest(format!("benchmark employee {id} has no score record"))
            }
        }
    }
}

impl From<FormulaFetchError> for ApiError {
    fn from(value: FormulaFetchError) -> Self {
        match value {
            FormulaFetchError::NotFound(version) => {
                ApiError::NotFound(format!("success formula not found: {version}"))
            }
            FormulaFetchError::Decode(err) => {
                ApiError::Internal(format!("stored success formula is malformed: {err}"))
            }
            FormulaFetchError::Invalid(err) => {
                ApiError::Internal(format!("stored success formula is invalid: {err}"))
            }
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<EmployeeFetchError> for ApiError {
    fn from(value: EmployeeFetchError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<VacancyStorageError> for ApiError {
    fn from(value: VacancyStorageError) -> Self {
        match value {
            VacancyStorageError::EmptyBenchmark => {
                ApiError::BadRequest("vacancy requires a non-empty benchmark set".into())
            }
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<MigrationError> for ApiError {
    fn from(value: MigrationError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<ProfileError> for ApiError {
    fn from(value: ProfileError) -> Self {
        match value {
            ProfileError::Parse(err) => {
                ApiError::Internal(format!("profile generator returned malformed json: {err}"))
            }
            ProfileError::EmptyContent => {
                ApiError::Internal("profile generator returned no content".into())
            }
            other => ApiError::ServiceUnavailable(other.to_string()),
        }
    }
}
