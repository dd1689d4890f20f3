use agt_store::StoreError;
use agt_types::{AgtError, ErrorCode, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("no pending challenge for this address")]
    ChallengeNotFound,

    #[error("challenge has expired")]
    ChallengeExpired,

    #[error("signature does not match the challenge")]
    InvalidSignature,

    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid or expired credential")]
    InvalidCredential,

    #[error("credential was issued for a different purpose")]
    WrongCredentialType,

    #[error("caller is not an admin")]
    NotAnAdmin,

    #[error("caller is not a super admin")]
    NotASuperAdmin,

    #[error("agent name is required")]
    MissingName,

    #[error("no agent registered for {0}")]
    AgentNotRegistered(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("credential encoding failed: {0}")]
    Encoding(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AgtError> for IdentityError {
    fn from(e: AgtError) -> Self {
        match e {
            AgtError::InvalidAddress(a) => IdentityError::InvalidAddress(a),
            AgtError::InvalidSignature => IdentityError::InvalidSignature,
            AgtError::InvalidRole(r) => IdentityError::InvalidRole(r),
            other => IdentityError::InvalidAddress(other.to_string()),
        }
    }
}

impl ErrorCode for IdentityError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::ChallengeExpired => "CHALLENGE_EXPIRED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MissingCredential => "MISSING_AUTH",
            Self::InvalidCredential => "INVALID_TOKEN",
            Self::WrongCredentialType => "INVALID_TOKEN_TYPE",
            Self::NotAnAdmin => "NOT_ADMIN",
            Self::NotASuperAdmin => "NOT_SUPER_ADMIN",
            Self::MissingName => "MISSING_NAME",
            Self::AgentNotRegistered(_) => "NO_AGENT",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::Encoding(_) => "SERVER_ERROR",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::InvalidAddress(_) | Self::MissingName | Self::InvalidRole(_) => {
                FailureClass::Validation
            }
            Self::ChallengeNotFound
            | Self::ChallengeExpired
            | Self::InvalidSignature
            | Self::MissingCredential
            | Self::InvalidCredential
            | Self::WrongCredentialType => FailureClass::Authentication,
            Self::NotAnAdmin | Self::NotASuperAdmin => FailureClass::Authorization,
            Self::AgentNotRegistered(_) => FailureClass::NotFound,
            Self::Encoding(_) | Self::Store(_) => FailureClass::Internal,
        }
    }
}
