use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use antiwaste_core::DomainError;
use antiwaste_infra::{LifecycleError, LifecycleResult, RepositoryError};

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::Domain(e) => domain_error_to_response(e),
        LifecycleError::Store(e @ (RepositoryError::Duplicate { .. } | RepositoryError::Unique(_))) => {
            json_error(StatusCode::CONFLICT, "conflict", e.to_string())
        }
        LifecycleError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::IncompleteContent(_) => {
            json_error(StatusCode::BAD_REQUEST, "incomplete_content", message)
        }
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvalidOperation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_operation", message)
        }
        DomainError::InvalidStateTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_state_transition", message)
        }
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", message),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path/body identifier, answering 400 `invalid_id` on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim().parse::<T>().map_err(domain_error_to_response)
}

/// Render a use-case result as JSON with `status`, or as the mapped error.
pub fn respond<T, V>(
    status: StatusCode,
    result: LifecycleResult<T>,
    view: impl FnOnce(&T) -> V,
) -> axum::response::Response
where
    V: Serialize,
{
    match result {
        Ok(value) => (status, axum::Json(view(&value))).into_response(),
        Err(e) => lifecycle_error_to_response(e),
    }
}
