//! Arena parameters: the timing and scoring constants every service reads.

use serde::{Deserialize, Serialize};

/// Tunable constants shared by the identity, season and stage services.
///
/// Loaded from the `[params]` table of the node configuration; any field left
/// out falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaParams {
    // ── Identity ─────────────────────────────────────────────────────────
    /// Lifetime of a sign-in challenge. Default: 5 minutes.
    pub challenge_ttl_secs: u64,

    /// Lifetime of a session credential. Default: 7 days.
    pub session_ttl_secs: u64,

    // ── Season ───────────────────────────────────────────────────────────
    /// Gap inserted between consecutive season windows. Default: 5 minutes.
    pub phase_gap_secs: u64,

    // ── Stage ────────────────────────────────────────────────────────────
    /// How long a performer holds the stage before the timeout fallback
    /// retires them regardless of quorum. Default: 3 minutes.
    pub performance_duration_secs: u64,

    /// How long a performer may hold the stage without submitting anything
    /// before being skipped. Default: 60 seconds.
    pub no_show_grace_secs: u64,

    /// Lowest accepted judge score.
    pub min_score: u8,

    /// Highest accepted judge score.
    pub max_score: u8,
}

impl ArenaParams {
    pub fn score_in_range(&self, score: i64) -> bool {
        score >= i64::from(self.min_score) && score <= i64::from(self.max_score)
    }
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            challenge_ttl_secs: 5 * 60,
            session_ttl_secs: 7 * 24 * 60 * 60,
            phase_gap_secs: 5 * 60,
            performance_duration_secs: 180,
            no_show_grace_secs: 60,
            min_score: 1,
            max_score: 10,
        }
    }
}
