//! The stage: one performing slot per (season, episode).
//!
//! The [`StageScheduler`] owns the running order and the retire-then-promote
//! step; [`ScoreAggregator`] collects judge scores; the [`StageDriver`]
//! combines quorum with a wall-clock fallback so a stalled performer never
//! blocks the queue.

pub mod driver;
pub mod error;
pub mod performance;
pub mod scheduler;
pub mod scores;
pub mod view;

pub use driver::{ForceReason, StageDriver, TickOutcome};
pub use error::StageError;
pub use performance::{PerformanceDesk, PerformanceSubmission};
pub use scheduler::{required_scores, AutoAdvance, StageMove, StageScheduler};
pub use scores::{ScoreAggregator, ScoreSummary};
pub use view::{StageView, StageViewer};
