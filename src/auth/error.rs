use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::store::StoreError;

/// Failures of the auth slice, typed at the component boundary and mapped
/// to an HTTP status + `{message}` body at the handler boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store unavailable")]
    Storage(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Unavailable(e) => AuthError::Storage(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AuthError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("missing required field: {field}"),
            ),
            AuthError::DuplicateEmail => {
                (StatusCode::CONFLICT, "email already registered".into())
            }
            AuthError::NotFound => (StatusCode::NOT_FOUND, "user not found".into()),
            AuthError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "invalid credentials".into())
            }
            // Never leak the underlying error to the client.
            AuthError::Storage(e) => {
                error!(error = %e, "credential store fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "credential store unavailable".into(),
                )
            }
            AuthError::Internal(e) => {
                error!(error = %e, "internal auth error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
