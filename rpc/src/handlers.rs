//! Route handlers. Each one extracts the bearer token and body, runs the
//! matching [`Arena`] action on the blocking pool, and wraps the result in
//! `{"ok": true, ...}`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use agt_identity::bearer_token;
use agt_node::{
    ActivateRequest, AdvanceRequest, Arena, ArenaError, ArenaMetrics, AuditionRequest,
    CreateSeasonRequest, DecisionRequest, GrantAdminRequest, JudgeRegistrationRequest,
    JudgeRequest, PerformanceRequest, RedeemRequest, RegisterRequest, ScoreRequest,
    SeedQueueRequest, StageRequest,
};

use crate::error::RpcError;
use crate::pagination::{paginate, PaginationParams};

/// Shared handler state.
#[derive(Clone)]
pub struct RpcState {
    pub arena: Arc<Arena>,
    /// `None` when metrics are disabled.
    pub metrics: Option<Arc<ArenaMetrics>>,
}

type ApiResult = Result<Json<Value>, RpcError>;

// ── Plumbing ─────────────────────────────────────────────────────────────

fn bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    bearer_token(header).map(str::to_string)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| RpcError::InvalidRequest(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, RpcError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| RpcError::InvalidRequest(rejection.body_text()))
}

/// Run an arena action off the async runtime; storage calls may block.
async fn run<T, F>(state: &RpcState, action: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&Arena) -> Result<T, ArenaError> + Send + 'static,
{
    let arena = state.arena.clone();
    tokio::task::spawn_blocking(move || action(&arena))
        .await
        .map_err(|e| RpcError::Internal(e.to_string()))?
        .map_err(RpcError::from)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Internal(e.to_string()))
}

/// `{"ok": true, <key>: value}`
fn ok<T: Serialize>(key: &str, value: T) -> ApiResult {
    ok_fields(vec![(key, to_json(value)?)])
}

fn ok_fields(fields: Vec<(&str, Value)>) -> ApiResult {
    let mut object = Map::new();
    object.insert("ok".to_string(), Value::Bool(true));
    for (key, value) in fields {
        object.insert(key.to_string(), value);
    }
    Ok(Json(Value::Object(object)))
}

// ── Health / metrics ─────────────────────────────────────────────────────

pub async fn health() -> ApiResult {
    ok("status", "ok")
}

pub async fn metrics(State(state): State<RpcState>) -> Result<impl IntoResponse, RpcError> {
    let metrics = state
        .metrics
        .as_ref()
        .ok_or_else(|| RpcError::NotFound("metrics are disabled".into()))?;
    let text = metrics
        .encode()
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

// ── Agent identity ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    #[serde(default)]
    pub address: String,
}

pub async fn issue_challenge(
    State(state): State<RpcState>,
    params: Result<Query<ChallengeQuery>, QueryRejection>,
) -> ApiResult {
    let params = query(params)?;
    let challenge = run(&state, move |arena| arena.issue_challenge(&params.address)).await?;
    ok("challenge", challenge)
}

pub async fn redeem_challenge(
    State(state): State<RpcState>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> ApiResult {
    let req = body(payload)?;
    let grant = run(&state, move |arena| arena.redeem_challenge(req)).await?;
    ok("session", grant)
}

pub async fn register_agent(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let registration = run(&state, move |arena| {
        arena.register_agent(token.as_deref(), req)
    })
    .await?;
    ok("registration", registration)
}

pub async fn me(State(state): State<RpcState>, headers: HeaderMap) -> ApiResult {
    let token = bearer(&headers);
    let me = run(&state, move |arena| arena.me(token.as_deref())).await?;
    ok("me", me)
}

// ── Public season reads ──────────────────────────────────────────────────

pub async fn list_seasons(State(state): State<RpcState>) -> ApiResult {
    let seasons = run(&state, |arena| arena.list_seasons()).await?;
    ok("seasons", seasons)
}

pub async fn current_season(State(state): State<RpcState>) -> ApiResult {
    let season = run(&state, |arena| arena.current_season()).await?;
    ok("season", season)
}

pub async fn get_season(State(state): State<RpcState>, Path(id): Path<String>) -> ApiResult {
    let season = run(&state, move |arena| arena.get_season(&id)).await?;
    ok("season", season)
}

pub async fn current_stage(State(state): State<RpcState>, Path(id): Path<String>) -> ApiResult {
    let stage = run(&state, move |arena| arena.current_stage(&id)).await?;
    ok("stage", stage)
}

// ── Agent and judge actions ──────────────────────────────────────────────

pub async fn submit_audition(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<AuditionRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let receipt = run(&state, move |arena| {
        arena.submit_audition(token.as_deref(), req)
    })
    .await?;
    ok_fields(vec![
        ("agent", to_json(receipt.agent)?),
        ("audition", to_json(receipt.audition)?),
    ])
}

pub async fn submit_performance(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let performance = run(&state, move |arena| {
        arena.submit_performance(token.as_deref(), req)
    })
    .await?;
    ok("performance", performance)
}

pub async fn submit_score(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let score = run(&state, move |arena| arena.submit_score(token.as_deref(), req)).await?;
    ok("score", score)
}

// ── Season administration ────────────────────────────────────────────────

pub async fn create_season(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<CreateSeasonRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let season = run(&state, move |arena| arena.create_season(token.as_deref(), req)).await?;
    ok("season", season)
}

pub async fn activate_season(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let season = run(&state, move |arena| {
        arena.activate_season(token.as_deref(), &id, req)
    })
    .await?;
    ok("season", season)
}

pub async fn advance_phase(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let season = run(&state, move |arena| {
        arena.advance_phase(token.as_deref(), &id, req)
    })
    .await?;
    ok("season", season)
}

pub async fn list_auditions(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let params = query(params)?;
    let auditions = run(&state, move |arena| {
        arena.list_auditions(token.as_deref(), &id)
    })
    .await?;
    let (page, cursor) = paginate(auditions, &params);
    ok_fields(vec![
        ("auditions", to_json(page)?),
        ("cursor", to_json(cursor)?),
    ])
}

pub async fn decide_audition(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let audition = run(&state, move |arena| {
        arena.decide_audition(token.as_deref(), &id, req)
    })
    .await?;
    ok("audition", audition)
}

pub async fn list_judges(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let token = bearer(&headers);
    let judges = run(&state, move |arena| arena.list_judges(token.as_deref(), &id)).await?;
    ok("judges", judges)
}

pub async fn add_judge(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<JudgeRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let judge = run(&state, move |arena| arena.add_judge(token.as_deref(), &id, req)).await?;
    ok("judge", judge)
}

pub async fn remove_judge(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<JudgeRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let address = req.address.clone();
    run(&state, move |arena| arena.remove_judge(token.as_deref(), &id, req)).await?;
    ok("removed", address)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonQuery {
    #[serde(default, alias = "season_id")]
    pub season_id: String,
}

pub async fn my_audition(
    State(state): State<RpcState>,
    headers: HeaderMap,
    params: Result<Query<SeasonQuery>, QueryRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let params = query(params)?;
    let audition = run(&state, move |arena| {
        arena.my_audition(token.as_deref(), &params.season_id)
    })
    .await?;
    ok("audition", audition)
}

pub async fn season_judges(
    State(state): State<RpcState>,
    params: Result<Query<SeasonQuery>, QueryRejection>,
) -> ApiResult {
    let params = query(params)?;
    let judges = run(&state, move |arena| arena.season_judges(&params.season_id)).await?;
    ok("judges", judges)
}

pub async fn register_judge(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<JudgeRegistrationRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let judge = run(&state, move |arena| arena.register_judge(token.as_deref(), req)).await?;
    ok("judge", judge)
}

#[derive(Debug, Default, Deserialize)]
pub struct EpisodeQuery {
    pub episode: Option<u8>,
}

pub async fn list_queue(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    params: Result<Query<EpisodeQuery>, QueryRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let params = query(params)?;
    let queue = run(&state, move |arena| {
        arena.list_queue(token.as_deref(), &id, params.episode)
    })
    .await?;
    ok("queue", queue)
}

pub async fn seed_queue(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<SeedQueueRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let queue = run(&state, move |arena| arena.seed_queue(token.as_deref(), &id, req)).await?;
    ok("queue", queue)
}

pub async fn start_next(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<StageRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let stage_move = run(&state, move |arena| arena.start_next(token.as_deref(), &id, req)).await?;
    ok("stage", stage_move)
}

pub async fn auto_advance(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<StageRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let outcome = run(&state, move |arena| {
        arena.auto_advance(token.as_deref(), &id, req)
    })
    .await?;
    ok("result", outcome)
}

pub async fn tick(
    State(state): State<RpcState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<StageRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let outcome = run(&state, move |arena| arena.tick(token.as_deref(), &id, req)).await?;
    ok("result", outcome)
}

// ── Admin management ─────────────────────────────────────────────────────

pub async fn admin_me(State(state): State<RpcState>, headers: HeaderMap) -> ApiResult {
    let token = bearer(&headers);
    let principal = run(&state, move |arena| arena.admin_me(token.as_deref())).await?;
    ok("admin", principal)
}

pub async fn list_admins(State(state): State<RpcState>, headers: HeaderMap) -> ApiResult {
    let token = bearer(&headers);
    let admins = run(&state, move |arena| arena.list_admins(token.as_deref())).await?;
    ok("admins", admins)
}

pub async fn grant_admin(
    State(state): State<RpcState>,
    headers: HeaderMap,
    payload: Result<Json<GrantAdminRequest>, JsonRejection>,
) -> ApiResult {
    let token = bearer(&headers);
    let req = body(payload)?;
    let admin = run(&state, move |arena| arena.grant_admin(token.as_deref(), req)).await?;
    ok("admin", admin)
}
