//! Prometheus metrics for the arena node.
//!
//! [`ArenaMetrics`] owns a dedicated [`Registry`] that the HTTP `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::NodeError;

pub struct ArenaMetrics {
    pub registry: Registry,

    // ── Identity ────────────────────────────────────────────────────────
    pub challenges_issued: IntCounter,
    pub sessions_issued: IntCounter,
    /// Requests rejected because the caller could not be authenticated.
    pub auth_failures: IntCounter,

    // ── Season ──────────────────────────────────────────────────────────
    pub auditions_submitted: IntCounter,
    pub phase_changes: IntCounter,

    // ── Stage ───────────────────────────────────────────────────────────
    pub performances_submitted: IntCounter,
    pub scores_submitted: IntCounter,
    /// Stage moves, labelled by `trigger`: start, quorum or forced.
    pub stage_advances: IntCounterVec,
}

impl ArenaMetrics {
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let challenges_issued = register_int_counter_with_registry!(
            Opts::new("agt_challenges_issued_total", "Sign-in challenges issued"),
            registry
        )?;
        let sessions_issued = register_int_counter_with_registry!(
            Opts::new("agt_sessions_issued_total", "Session credentials issued"),
            registry
        )?;
        let auth_failures = register_int_counter_with_registry!(
            Opts::new(
                "agt_auth_failures_total",
                "Requests rejected for failed authentication"
            ),
            registry
        )?;
        let auditions_submitted = register_int_counter_with_registry!(
            Opts::new("agt_auditions_submitted_total", "Audition submissions"),
            registry
        )?;
        let phase_changes = register_int_counter_with_registry!(
            Opts::new(
                "agt_phase_changes_total",
                "Season activations and phase advances"
            ),
            registry
        )?;
        let performances_submitted = register_int_counter_with_registry!(
            Opts::new("agt_performances_submitted_total", "Performance submissions"),
            registry
        )?;
        let scores_submitted = register_int_counter_with_registry!(
            Opts::new("agt_scores_submitted_total", "Judge scores recorded"),
            registry
        )?;
        let stage_advances = register_int_counter_vec_with_registry!(
            Opts::new("agt_stage_advances_total", "Stage retire-then-promote steps"),
            &["trigger"],
            registry
        )?;

        Ok(Self {
            registry,
            challenges_issued,
            sessions_issued,
            auth_failures,
            auditions_submitted,
            phase_changes,
            performances_submitted,
            scores_submitted,
            stage_advances,
        })
    }

    pub fn stage_advanced(&self, trigger: &str) {
        self.stage_advances.with_label_values(&[trigger]).inc();
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
