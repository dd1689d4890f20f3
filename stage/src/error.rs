use agt_season::SeasonError;
use agt_store::StoreError;
use agt_types::{AgtError, ErrorCode, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("season {0} not found")]
    SeasonNotFound(String),

    #[error("agentIds must be a non-empty list")]
    MissingAgentIds,

    #[error("agent {0} appears more than once in the running order")]
    DuplicateAgent(String),

    #[error("agent {0} not found")]
    AgentNotFound(String),

    #[error("the stage moved before this request was applied")]
    StageMoved,

    #[error("invalid episode: {0}")]
    InvalidEpisode(String),

    #[error("caller is not an active judge for this season")]
    NotAJudge,

    #[error("score {0} is out of range")]
    InvalidScore(i64),

    #[error("performance {0} not found in this season")]
    PerformanceNotFound(String),

    #[error("no agent registered for {0}")]
    AgentNotRegistered(String),

    #[error("audition has not been accepted")]
    NotAccepted,

    #[error("season is not in a performance episode")]
    NotInPerformanceWindow,

    #[error("agent is not the current performer")]
    NotCurrentPerformer,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid content type: {0}")]
    InvalidContentKind(String),

    #[error(transparent)]
    Season(#[from] SeasonError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AgtError> for StageError {
    fn from(e: AgtError) -> Self {
        match e {
            AgtError::InvalidEpisode(ep) => StageError::InvalidEpisode(ep),
            AgtError::InvalidContentKind(k) => StageError::InvalidContentKind(k),
            other => StageError::Season(other.into()),
        }
    }
}

impl ErrorCode for StageError {
    fn code(&self) -> &'static str {
        match self {
            Self::SeasonNotFound(_) => "SEASON_NOT_FOUND",
            Self::MissingAgentIds => "MISSING_AGENT_IDS",
            Self::DuplicateAgent(_) => "DUPLICATE_AGENT",
            Self::AgentNotFound(_) => "AGENT_NOT_FOUND",
            Self::StageMoved => "STAGE_MOVED",
            Self::InvalidEpisode(_) => "INVALID_EPISODE",
            Self::NotAJudge => "NOT_A_JUDGE",
            Self::InvalidScore(_) => "INVALID_SCORE",
            Self::PerformanceNotFound(_) => "PERFORMANCE_NOT_FOUND",
            Self::AgentNotRegistered(_) => "AGENT_NOT_REGISTERED",
            Self::NotAccepted => "NOT_ACCEPTED",
            Self::NotInPerformanceWindow => "NOT_IN_PERFORMANCE_WINDOW",
            Self::NotCurrentPerformer => "NOT_CURRENT_PERFORMER",
            Self::MissingField(_) => "MISSING_FIELDS",
            Self::InvalidContentKind(_) => "INVALID_TYPE",
            Self::Season(e) => e.code(),
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::SeasonNotFound(_)
            | Self::AgentNotFound(_)
            | Self::PerformanceNotFound(_)
            | Self::AgentNotRegistered(_) => FailureClass::NotFound,
            Self::MissingAgentIds
            | Self::DuplicateAgent(_)
            | Self::InvalidEpisode(_)
            | Self::InvalidScore(_)
            | Self::MissingField(_)
            | Self::InvalidContentKind(_) => FailureClass::Validation,
            Self::NotAJudge | Self::NotAccepted => FailureClass::Authorization,
            Self::StageMoved | Self::NotInPerformanceWindow | Self::NotCurrentPerformer => {
                FailureClass::StateConflict
            }
            Self::Season(e) => e.class(),
            Self::Store(_) => FailureClass::Internal,
        }
    }
}

pub(crate) fn season_lookup(id: &agt_types::SeasonId, e: StoreError) -> StageError {
    if e.is_not_found() {
        StageError::SeasonNotFound(id.to_string())
    } else {
        StageError::Store(e)
    }
}
