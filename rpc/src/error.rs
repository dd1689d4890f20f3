//! HTTP error responses.
//!
//! Every failure renders as `{"ok": false, "code": ..., "message": ...}`
//! with the status picked from the error's [`FailureClass`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use agt_node::ArenaError;
use agt_types::{ErrorCode, FailureClass};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for RpcError {
    fn code(&self) -> &'static str {
        match self {
            Self::Arena(e) => e.code(),
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) | Self::Io(_) => "SERVER_ERROR",
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::Arena(e) => e.class(),
            Self::InvalidRequest(_) => FailureClass::Validation,
            Self::NotFound(_) => FailureClass::NotFound,
            Self::Internal(_) | Self::Io(_) => FailureClass::Internal,
        }
    }
}

pub fn status_for(class: FailureClass) -> StatusCode {
    match class {
        FailureClass::Authentication => StatusCode::UNAUTHORIZED,
        FailureClass::Authorization => StatusCode::FORBIDDEN,
        FailureClass::Validation => StatusCode::BAD_REQUEST,
        FailureClass::StateConflict => StatusCode::CONFLICT,
        FailureClass::NotFound => StatusCode::NOT_FOUND,
        FailureClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = status_for(self.class());
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        } else {
            debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = json!({
            "ok": false,
            "code": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
