//! Error taxonomy for the request path.
//!
//! # Responsibilities
//! - Name every failure class a handler can surface
//! - Map each class to an HTTP status and the uniform error envelope
//! - Convert collaborator and merge errors into the taxonomy
//!
//! # Design Decisions
//! - Errors propagate as values; nothing on the request path panics
//! - The wire shape is always `{"error": "<message>"}`

use axum::http::StatusCode;
use thiserror::Error;

use crate::merge::{Kind, MergeError};
use crate::notify::NotifyError;
use crate::routing::context::Response;
use crate::store::StoreError;

/// Failure classes surfaced by business handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} does not exist")]
    NotFound(Kind),

    #[error("{0} already exists")]
    AlreadyExists(Kind),

    #[error("stored record is not a {0}")]
    KindMismatch(Kind),

    #[error("malformed payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("field {0:?} is immutable")]
    ImmutableField(&'static str),

    #[error("missing path parameter {0:?}")]
    MissingParam(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::KindMismatch(_) => StatusCode::CONFLICT,
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::ImmutableField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Collaborator(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Render as the uniform error envelope.
    pub fn into_envelope(self) -> Response {
        Response::error(self.status(), self.to_string())
    }
}

impl From<MergeError> for ApiError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::KindMismatch { expected, .. } => ApiError::KindMismatch(expected),
            MergeError::ImmutableField(field) => ApiError::ImmutableField(field),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Collaborator(err.to_string())
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        ApiError::Collaborator(err.to_string())
    }
}
