//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers::{self, RpcState};

/// Every route, with shared state attached.
pub fn build_router(state: RpcState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // agent identity
        .route("/api/agent/challenge", get(handlers::issue_challenge))
        .route("/api/agent/session", post(handlers::redeem_challenge))
        .route("/api/agent/register", post(handlers::register_agent))
        .route("/api/agent/me", get(handlers::me))
        // public reads
        .route("/api/seasons", get(handlers::list_seasons))
        .route("/api/seasons/current", get(handlers::current_season))
        .route("/api/seasons/:id", get(handlers::get_season))
        .route("/api/seasons/:id/stage", get(handlers::current_stage))
        // agents and judges
        .route("/api/auditions/apply", post(handlers::submit_audition))
        .route("/api/auditions/me", get(handlers::my_audition))
        .route("/api/performances/submit", post(handlers::submit_performance))
        .route("/api/judges", get(handlers::season_judges))
        .route("/api/judges/register", post(handlers::register_judge))
        .route("/api/judges/score", post(handlers::submit_score))
        // season administration
        .route("/api/admin/seasons", post(handlers::create_season))
        .route("/api/admin/seasons/:id/activate", post(handlers::activate_season))
        .route("/api/admin/seasons/:id/advance", post(handlers::advance_phase))
        .route("/api/admin/seasons/:id/auditions", get(handlers::list_auditions))
        .route(
            "/api/admin/seasons/:id/auditions/decision",
            post(handlers::decide_audition),
        )
        .route("/api/admin/seasons/:id/judges", get(handlers::list_judges))
        .route("/api/admin/seasons/:id/judges/add", post(handlers::add_judge))
        .route("/api/admin/seasons/:id/judges/remove", post(handlers::remove_judge))
        .route("/api/admin/seasons/:id/performances", get(handlers::list_queue))
        .route(
            "/api/admin/seasons/:id/performances/queue",
            post(handlers::seed_queue),
        )
        .route(
            "/api/admin/seasons/:id/performances/next",
            post(handlers::start_next),
        )
        .route(
            "/api/admin/seasons/:id/performances/auto-advance",
            post(handlers::auto_advance),
        )
        .route(
            "/api/admin/seasons/:id/performances/tick",
            post(handlers::tick),
        )
        // admin management
        .route("/api/admin/me", get(handlers::admin_me))
        .route("/api/admin/admins", get(handlers::list_admins))
        .route("/api/admin/admins/allowlist", post(handlers::grant_admin))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    state: RpcState,
}

impl RpcServer {
    pub fn new(port: u16, state: RpcState) -> Self {
        Self { port, state }
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "HTTP API listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("HTTP API stopped");
        Ok(())
    }
}
