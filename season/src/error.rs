use agt_identity::IdentityError;
use agt_store::StoreError;
use agt_types::{AgtError, AuditionStatus, ErrorCode, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("season {0} not found")]
    SeasonNotFound(String),

    #[error("only a draft season can be activated")]
    NotDraft,

    #[error("every phase duration must be at least one day")]
    InvalidDurations,

    #[error("invalid phase target: {0}")]
    InvalidPhase(String),

    #[error("season phase changed concurrently; re-read and retry")]
    PhaseConflict,

    #[error("season name is required")]
    MissingName,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid talent category: {0}")]
    InvalidCategory(String),

    #[error("auditions are not open for this season")]
    AuditionsClosed,

    #[error("audition has already been {0}")]
    AuditionAlreadyDecided(AuditionStatus),

    #[error("invalid audition status: {0}")]
    InvalidStatus(String),

    #[error("cannot move an audition from {from} to {to}")]
    InvalidTransition {
        from: AuditionStatus,
        to: AuditionStatus,
    },

    #[error("audition changed while it was being reviewed; re-read and retry")]
    AuditionConflict,

    #[error("audition {0} not found in this season")]
    AuditionNotFound(String),

    #[error("{0} is not on this season's judge roster")]
    JudgeNotFound(String),

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AgtError> for SeasonError {
    fn from(e: AgtError) -> Self {
        match e {
            AgtError::InvalidPhase(p) => SeasonError::InvalidPhase(p),
            AgtError::InvalidStatus(s) => SeasonError::InvalidStatus(s),
            AgtError::InvalidCategory(c) => SeasonError::InvalidCategory(c),
            AgtError::InvalidAddress(a) => SeasonError::InvalidAddress(a),
            other => SeasonError::InvalidAddress(other.to_string()),
        }
    }
}

impl ErrorCode for SeasonError {
    fn code(&self) -> &'static str {
        match self {
            Self::SeasonNotFound(_) => "SEASON_NOT_FOUND",
            Self::NotDraft => "ONLY_DRAFT_CAN_ACTIVATE",
            Self::InvalidDurations => "INVALID_DURATIONS",
            Self::InvalidPhase(_) => "INVALID_PHASE",
            Self::PhaseConflict => "PHASE_CONFLICT",
            Self::MissingName => "MISSING_NAME",
            Self::MissingField(_) => "MISSING_FIELDS",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::AuditionsClosed => "AUDITIONS_CLOSED",
            Self::AuditionAlreadyDecided(_) => "AUDITION_ALREADY_DECIDED",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AuditionConflict => "AUDITION_CONFLICT",
            Self::AuditionNotFound(_) => "NO_AUDITION",
            Self::JudgeNotFound(_) => "JUDGE_NOT_FOUND",
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::Identity(e) => e.code(),
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::SeasonNotFound(_) | Self::AuditionNotFound(_) | Self::JudgeNotFound(_) => {
                FailureClass::NotFound
            }
            Self::NotDraft
            | Self::PhaseConflict
            | Self::AuditionsClosed
            | Self::AuditionAlreadyDecided(_)
            | Self::AuditionConflict
            | Self::InvalidTransition { .. } => FailureClass::StateConflict,
            Self::InvalidDurations
            | Self::InvalidPhase(_)
            | Self::MissingName
            | Self::MissingField(_)
            | Self::InvalidCategory(_)
            | Self::InvalidStatus(_)
            | Self::InvalidAddress(_) => FailureClass::Validation,
            Self::Identity(e) => e.class(),
            Self::Store(_) => FailureClass::Internal,
        }
    }
}

/// Map a store `NotFound` on a season lookup to `SeasonNotFound`.
pub(crate) fn season_lookup(id: &agt_types::SeasonId, e: StoreError) -> SeasonError {
    if e.is_not_found() {
        SeasonError::SeasonNotFound(id.to_string())
    } else {
        SeasonError::Store(e)
    }
}
