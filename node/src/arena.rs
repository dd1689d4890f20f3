//! The arena facade: one method per externally visible action.
//!
//! Every action takes the caller's bearer token (if the action needs one)
//! plus a request body, authenticates, delegates to the owning service and
//! counts the outcome in [`ArenaMetrics`]. The HTTP layer is a thin mapping
//! from routes onto these methods.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use agt_identity::{
    AccessControl, AgentProfile, AgentRegistry, Challenge, IdentityError, IdentityVerifier,
    Principal, SessionGrant, SessionIssuer,
};
use agt_season::{AuditionGate, AuditionSubmission, JudgeRoster, SeasonError, SeasonLifecycle};
use agt_stage::{
    AutoAdvance, PerformanceDesk, PerformanceSubmission, ScoreAggregator, StageDriver,
    StageError, StageMove, StageScheduler, StageView, StageViewer, TickOutcome,
};
use agt_store::{
    AdminRecord, AgentRecord, ArenaStore, AuditionRecord, JudgeRecord,
    PerformanceRecord, QueueEntry, ScoreRecord, SeasonRecord,
};
use agt_types::{
    AgentId, ArenaParams, AuditionId, Clock, Episode, ErrorCode, FailureClass, PerformanceId,
    Role, SeasonDurations, SeasonId,
};

use crate::metrics::ArenaMetrics;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("invalid season id: {0}")]
    InvalidSeasonId(String),

    #[error("invalid {field}: {value}")]
    InvalidId { field: &'static str, value: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Season(#[from] SeasonError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

impl ErrorCode for ArenaError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidSeasonId(_) => "INVALID_SEASON_ID",
            Self::InvalidId { .. } => "INVALID_ID",
            Self::Identity(e) => e.code(),
            Self::Season(e) => e.code(),
            Self::Stage(e) => e.code(),
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::InvalidSeasonId(_) | Self::InvalidId { .. } => FailureClass::Validation,
            Self::Identity(e) => e.class(),
            Self::Season(e) => e.class(),
            Self::Stage(e) => e.class(),
        }
    }
}

// ── Requests ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct RedeemRequest {
    pub address: String,
    pub signature: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "displayName")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateSeasonRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Omitted durations fall back to 2 / 3 / 2 days.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub auditions_days: Option<u32>,
    #[serde(default)]
    pub voting_days: Option<u32>,
    #[serde(default)]
    pub episode2_days: Option<u32>,
}

impl ActivateRequest {
    fn durations(&self) -> SeasonDurations {
        let defaults = SeasonDurations::default();
        SeasonDurations {
            auditions_days: self.auditions_days.unwrap_or(defaults.auditions_days),
            voting_days: self.voting_days.unwrap_or(defaults.voting_days),
            episode2_days: self.episode2_days.unwrap_or(defaults.episode2_days),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditionRequest {
    pub season_id: String,
    /// Only needed when the wallet has no agent profile yet.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub audition_id: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct JudgeRequest {
    pub address: String,
    #[serde(default)]
    pub specializations: Vec<String>,
}

/// An agent volunteering to judge a season.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRegistrationRequest {
    #[serde(alias = "season_id")]
    pub season_id: String,
    #[serde(default, alias = "specialization")]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedQueueRequest {
    #[serde(default)]
    pub episode: Option<u8>,
    #[serde(default)]
    pub agent_ids: Vec<String>,
}

/// Body of the next / auto-advance / tick actions.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequest {
    #[serde(default)]
    pub episode: Option<u8>,
    /// Zero or absent means "every active judge".
    #[serde(default)]
    pub min_scores: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GrantAdminRequest {
    pub address: String,
    pub role: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRequest {
    pub season_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub season_id: String,
    pub performance_id: String,
    pub score: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

// ── Responses ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    pub agent: AgentRecord,
    pub created: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub principal: Principal,
    pub agent: Option<AgentRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditionReceipt {
    pub agent: AgentRecord,
    pub audition: AuditionRecord,
}

// ── Facade ─────────────────────────────────────────────────────────────

/// Every arena service wired onto one store and one clock.
pub struct Arena {
    verifier: IdentityVerifier,
    sessions: Arc<SessionIssuer>,
    access: AccessControl,
    agents: AgentRegistry,
    seasons: SeasonLifecycle,
    auditions: AuditionGate,
    judges: JudgeRoster,
    scheduler: Arc<StageScheduler>,
    driver: StageDriver,
    scores: ScoreAggregator,
    performances: PerformanceDesk,
    viewer: StageViewer,
    metrics: Arc<ArenaMetrics>,
}

impl Arena {
    pub fn new(
        store: Arc<dyn ArenaStore>,
        clock: Arc<dyn Clock>,
        params: &ArenaParams,
        session_secret: Vec<u8>,
        metrics: Arc<ArenaMetrics>,
    ) -> Self {
        let sessions = Arc::new(SessionIssuer::new(
            session_secret,
            clock.clone(),
            params.session_ttl_secs,
        ));
        let scheduler = Arc::new(StageScheduler::new(store.clone(), clock.clone()));
        Self {
            verifier: IdentityVerifier::new(
                store.clone(),
                clock.clone(),
                params.challenge_ttl_secs,
            ),
            access: AccessControl::new(store.clone(), sessions.clone(), clock.clone()),
            sessions,
            agents: AgentRegistry::new(store.clone(), clock.clone()),
            seasons: SeasonLifecycle::new(store.clone(), clock.clone(), params.phase_gap_secs),
            auditions: AuditionGate::new(store.clone(), clock.clone()),
            judges: JudgeRoster::new(store.clone(), clock.clone()),
            driver: StageDriver::new(
                scheduler.clone(),
                clock.clone(),
                params.performance_duration_secs,
                params.no_show_grace_secs,
            ),
            scheduler,
            scores: ScoreAggregator::new(store.clone(), clock.clone(), params.clone()),
            performances: PerformanceDesk::new(store.clone(), clock),
            viewer: StageViewer::new(store),
            metrics,
        }
    }

    pub fn metrics(&self) -> &ArenaMetrics {
        &self.metrics
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ── Identity ────────────────────────────────────────────────────────

    pub fn issue_challenge(&self, address: &str) -> Result<Challenge, ArenaError> {
        let challenge = self.verifier.issue_challenge(address)?;
        self.metrics.challenges_issued.inc();
        Ok(challenge)
    }

    pub fn redeem_challenge(&self, req: RedeemRequest) -> Result<SessionGrant, ArenaError> {
        let address = self
            .observe(self.verifier.redeem(&req.address, &req.signature))?;
        let grant = self.sessions.issue(&address)?;
        self.metrics.sessions_issued.inc();
        Ok(grant)
    }

    pub fn register_agent(
        &self,
        token: Option<&str>,
        req: RegisterRequest,
    ) -> Result<Registration, ArenaError> {
        let caller = self.authenticate(token)?;
        let (agent, created) = self.agents.register(
            &caller.address,
            AgentProfile {
                display_name: req.name,
                description: req.description,
                website: req.website,
            },
        )?;
        Ok(Registration { agent, created })
    }

    pub fn me(&self, token: Option<&str>) -> Result<Me, ArenaError> {
        let principal = self.authenticate(token)?;
        let agent = self.agents.find(&principal.address)?;
        Ok(Me { principal, agent })
    }

    pub fn grant_admin(
        &self,
        token: Option<&str>,
        req: GrantAdminRequest,
    ) -> Result<Option<AdminRecord>, ArenaError> {
        let caller = self.observe(self.access.require_super_admin(token))?;
        let role = Role::from_str(&req.role).map_err(IdentityError::from)?;
        Ok(self.access.grant_admin(&caller, &req.address, role)?)
    }

    /// The caller's admin principal; `NOT_ADMIN` for everyone else.
    pub fn admin_me(&self, token: Option<&str>) -> Result<Principal, ArenaError> {
        self.require_admin(token)
    }

    pub fn list_admins(&self, token: Option<&str>) -> Result<Vec<AdminRecord>, ArenaError> {
        self.observe(self.access.require_super_admin(token))?;
        Ok(self.access.list_admins()?)
    }

    // ── Seasons ─────────────────────────────────────────────────────────

    pub fn list_seasons(&self) -> Result<Vec<SeasonRecord>, ArenaError> {
        Ok(self.seasons.list()?)
    }

    pub fn get_season(&self, season: &str) -> Result<SeasonRecord, ArenaError> {
        Ok(self.seasons.get(&season_id(season)?)?)
    }

    pub fn current_season(&self) -> Result<Option<SeasonRecord>, ArenaError> {
        Ok(self.seasons.current()?)
    }

    pub fn create_season(
        &self,
        token: Option<&str>,
        req: CreateSeasonRequest,
    ) -> Result<SeasonRecord, ArenaError> {
        let admin = self.require_admin(token)?;
        Ok(self
            .seasons
            .create(&admin.address, &req.name, req.description)?)
    }

    pub fn activate_season(
        &self,
        token: Option<&str>,
        season: &str,
        req: ActivateRequest,
    ) -> Result<SeasonRecord, ArenaError> {
        let admin = self.require_admin(token)?;
        let id = season_id(season)?;
        let record = self.seasons.activate(&id, req.durations())?;
        self.metrics.phase_changes.inc();
        info!(season = %id, by = %admin.address, "season activated");
        Ok(record)
    }

    pub fn advance_phase(
        &self,
        token: Option<&str>,
        season: &str,
        req: AdvanceRequest,
    ) -> Result<SeasonRecord, ArenaError> {
        let admin = self.require_admin(token)?;
        let id = season_id(season)?;
        let record = self.seasons.advance_to_named(&id, req.target.as_deref())?;
        self.metrics.phase_changes.inc();
        info!(season = %id, phase = %record.phase, by = %admin.address, "phase advanced");
        Ok(record)
    }

    // ── Auditions ───────────────────────────────────────────────────────

    pub fn submit_audition(
        &self,
        token: Option<&str>,
        req: AuditionRequest,
    ) -> Result<AuditionReceipt, ArenaError> {
        let caller = self.authenticate(token)?;
        let id = season_id(&req.season_id)?;
        let (agent, audition) = self.auditions.submit(
            &id,
            &caller.address,
            AuditionSubmission {
                display_name: req.display_name.unwrap_or_default(),
                category: req.category,
                title: req.title,
                content: req.content,
            },
        )?;
        self.metrics.auditions_submitted.inc();
        Ok(AuditionReceipt { agent, audition })
    }

    pub fn my_audition(
        &self,
        token: Option<&str>,
        season: &str,
    ) -> Result<AuditionRecord, ArenaError> {
        let caller = self.authenticate(token)?;
        Ok(self.auditions.mine(&season_id(season)?, &caller.address)?)
    }

    pub fn list_auditions(
        &self,
        token: Option<&str>,
        season: &str,
    ) -> Result<Vec<AuditionRecord>, ArenaError> {
        self.require_admin(token)?;
        Ok(self.auditions.list(&season_id(season)?)?)
    }

    pub fn decide_audition(
        &self,
        token: Option<&str>,
        season: &str,
        req: DecisionRequest,
    ) -> Result<AuditionRecord, ArenaError> {
        let admin = self.require_admin(token)?;
        let season = season_id(season)?;
        let audition: AuditionId = parse_id(&req.audition_id, "auditionId")?;
        Ok(self
            .auditions
            .decide(&season, &audition, &req.status, req.notes, &admin.address)?)
    }

    // ── Judges ──────────────────────────────────────────────────────────

    pub fn add_judge(
        &self,
        token: Option<&str>,
        season: &str,
        req: JudgeRequest,
    ) -> Result<JudgeRecord, ArenaError> {
        self.require_admin(token)?;
        Ok(self
            .judges
            .add(&season_id(season)?, &req.address, req.specializations)?)
    }

    pub fn remove_judge(
        &self,
        token: Option<&str>,
        season: &str,
        req: JudgeRequest,
    ) -> Result<(), ArenaError> {
        self.require_admin(token)?;
        Ok(self.judges.remove(&season_id(season)?, &req.address)?)
    }

    pub fn list_judges(
        &self,
        token: Option<&str>,
        season: &str,
    ) -> Result<Vec<JudgeRecord>, ArenaError> {
        self.require_admin(token)?;
        Ok(self.judges.list(&season_id(season)?)?)
    }

    /// The public roster: active judges only.
    pub fn season_judges(&self, season: &str) -> Result<Vec<JudgeRecord>, ArenaError> {
        let id = season_id(season)?;
        self.seasons.get(&id)?;
        let mut judges = self.judges.list(&id)?;
        judges.retain(|j| j.active);
        Ok(judges)
    }

    pub fn register_judge(
        &self,
        token: Option<&str>,
        req: JudgeRegistrationRequest,
    ) -> Result<JudgeRecord, ArenaError> {
        let caller = self.authenticate(token)?;
        Ok(self.judges.register_self(
            &season_id(&req.season_id)?,
            &caller.address,
            req.specializations,
            req.bio,
        )?)
    }

    // ── Stage ───────────────────────────────────────────────────────────

    pub fn seed_queue(
        &self,
        token: Option<&str>,
        season: &str,
        req: SeedQueueRequest,
    ) -> Result<Vec<QueueEntry>, ArenaError> {
        self.require_admin(token)?;
        let id = season_id(season)?;
        let episode = episode(req.episode)?;
        let agent_ids = req
            .agent_ids
            .iter()
            .map(|raw| parse_id::<AgentId>(raw, "agentIds"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.scheduler.seed(&id, episode, &agent_ids)?)
    }

    pub fn list_queue(
        &self,
        token: Option<&str>,
        season: &str,
        episode_number: Option<u8>,
    ) -> Result<Vec<QueueEntry>, ArenaError> {
        self.require_admin(token)?;
        Ok(self
            .scheduler
            .queue(&season_id(season)?, episode(episode_number)?)?)
    }

    pub fn start_next(
        &self,
        token: Option<&str>,
        season: &str,
        req: StageRequest,
    ) -> Result<StageMove, ArenaError> {
        self.require_admin(token)?;
        let stage_move = self
            .scheduler
            .start_next(&season_id(season)?, episode(req.episode)?)?;
        self.metrics.stage_advanced("start");
        Ok(stage_move)
    }

    pub fn auto_advance(
        &self,
        token: Option<&str>,
        season: &str,
        req: StageRequest,
    ) -> Result<AutoAdvance, ArenaError> {
        self.require_admin(token)?;
        let outcome = self.scheduler.auto_advance(
            &season_id(season)?,
            episode(req.episode)?,
            min_scores(req.min_scores),
        )?;
        if matches!(outcome, AutoAdvance::Advanced(_)) {
            self.metrics.stage_advanced("quorum");
        }
        Ok(outcome)
    }

    pub fn tick(
        &self,
        token: Option<&str>,
        season: &str,
        req: StageRequest,
    ) -> Result<TickOutcome, ArenaError> {
        self.require_admin(token)?;
        let outcome = self.driver.tick(
            &season_id(season)?,
            episode(req.episode)?,
            min_scores(req.min_scores),
        )?;
        match &outcome {
            TickOutcome::Started(_) => self.metrics.stage_advanced("start"),
            TickOutcome::Quorum(_) => self.metrics.stage_advanced("quorum"),
            TickOutcome::Forced { .. } => self.metrics.stage_advanced("forced"),
            TickOutcome::Idle { .. } => {}
        }
        Ok(outcome)
    }

    pub fn submit_performance(
        &self,
        token: Option<&str>,
        req: PerformanceRequest,
    ) -> Result<PerformanceRecord, ArenaError> {
        let caller = self.authenticate(token)?;
        let record = self.performances.submit(
            &season_id(&req.season_id)?,
            &caller.address,
            PerformanceSubmission {
                title: req.title,
                kind: req.kind,
                content: req.content,
            },
        )?;
        self.metrics.performances_submitted.inc();
        Ok(record)
    }

    pub fn submit_score(
        &self,
        token: Option<&str>,
        req: ScoreRequest,
    ) -> Result<ScoreRecord, ArenaError> {
        let caller = self.authenticate(token)?;
        let season = season_id(&req.season_id)?;
        let performance: PerformanceId = parse_id(&req.performance_id, "performanceId")?;
        let record = self.scores.submit_score(
            &season,
            &caller.address,
            &performance,
            req.score,
            req.notes,
        )?;
        self.metrics.scores_submitted.inc();
        Ok(record)
    }

    pub fn current_stage(&self, season: &str) -> Result<Option<StageView>, ArenaError> {
        Ok(self.viewer.current_stage(&season_id(season)?)?)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn authenticate(&self, token: Option<&str>) -> Result<Principal, ArenaError> {
        self.observe(self.access.authenticate(token))
    }

    fn require_admin(&self, token: Option<&str>) -> Result<Principal, ArenaError> {
        self.observe(self.access.require_admin(token))
    }

    /// Count authentication failures on their way out.
    fn observe<T>(&self, result: Result<T, IdentityError>) -> Result<T, ArenaError> {
        result.map_err(|e| {
            if e.class() == FailureClass::Authentication {
                self.metrics.auth_failures.inc();
            }
            ArenaError::from(e)
        })
    }
}

fn season_id(raw: &str) -> Result<SeasonId, ArenaError> {
    raw.parse()
        .map_err(|_| ArenaError::InvalidSeasonId(raw.to_string()))
}

fn parse_id<T: FromStr>(raw: &str, field: &'static str) -> Result<T, ArenaError> {
    raw.parse().map_err(|_| ArenaError::InvalidId {
        field,
        value: raw.to_string(),
    })
}

/// Episode 1 unless the caller names one.
fn episode(number: Option<u8>) -> Result<Episode, ArenaError> {
    Episode::from_number(number.unwrap_or(1)).map_err(|e| StageError::from(e).into())
}

fn min_scores(requested: Option<u32>) -> Option<u32> {
    requested.filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_defaults_fill_missing_durations() {
        let req: ActivateRequest = serde_json::from_str(r#"{"votingDays": 5}"#).unwrap();
        assert_eq!(
            req.durations(),
            SeasonDurations {
                auditions_days: 2,
                voting_days: 5,
                episode2_days: 2,
            }
        );
    }

    #[test]
    fn episode_defaults_to_one() {
        assert_eq!(episode(None).unwrap(), Episode::One);
        assert_eq!(episode(Some(2)).unwrap(), Episode::Two);
        let err = episode(Some(3)).unwrap_err();
        assert_eq!(err.code(), "INVALID_EPISODE");
    }

    #[test]
    fn zero_min_scores_means_unspecified() {
        assert_eq!(min_scores(Some(0)), None);
        assert_eq!(min_scores(Some(2)), Some(2));
        assert_eq!(min_scores(None), None);
    }

    #[test]
    fn bad_ids_are_validation_errors() {
        let err = season_id("nope").unwrap_err();
        assert_eq!(err.code(), "INVALID_SEASON_ID");
        assert_eq!(err.class(), FailureClass::Validation);
        let err = parse_id::<AgentId>("x", "agentIds").unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");
    }

    #[test]
    fn performance_request_reads_type_field() {
        let req: PerformanceRequest = serde_json::from_str(
            r#"{"seasonId": "s", "title": "t", "type": "text", "content": "c"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, "text");
    }
}
