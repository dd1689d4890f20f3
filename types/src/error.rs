//! Failure taxonomy and the parse-level error shared across crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse class of a failure. Decides how an outer surface reports it
/// (HTTP status, exit code) without knowing every concrete error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Caller could not prove who they are.
    Authentication,
    /// Caller is known but lacks the role.
    Authorization,
    /// Input is malformed or out of range.
    Validation,
    /// Request is well-formed but illegal in the current state.
    StateConflict,
    /// A referenced entity does not exist.
    NotFound,
    /// Storage or other internal failure.
    Internal,
}

/// Stable machine-readable identity of an error.
pub trait ErrorCode {
    /// SCREAMING_SNAKE code that never changes between releases.
    fn code(&self) -> &'static str;

    fn class(&self) -> FailureClass;
}

/// Errors raised while parsing arena values from untrusted input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AgtError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid season phase: {0}")]
    InvalidPhase(String),

    #[error("invalid audition status: {0}")]
    InvalidStatus(String),

    #[error("invalid talent category: {0}")]
    InvalidCategory(String),

    #[error("invalid episode: {0} (expected 1 or 2)")]
    InvalidEpisode(String),

    #[error("invalid content type: {0}")]
    InvalidContentKind(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),
}

impl ErrorCode for AgtError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidPhase(_) => "INVALID_PHASE",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidEpisode(_) => "INVALID_EPISODE",
            Self::InvalidContentKind(_) => "INVALID_CONTENT_TYPE",
            Self::InvalidRole(_) => "INVALID_ROLE",
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::InvalidSignature => FailureClass::Authentication,
            _ => FailureClass::Validation,
        }
    }
}
