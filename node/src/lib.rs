//! Arena node: the composition root.
//!
//! The node:
//! - Loads configuration and installs logging
//! - Opens LMDB or in-memory storage
//! - Builds the [`Arena`] facade over the identity, season and stage services
//! - Seeds super admins from configuration
//! - Owns the Prometheus registry and the shutdown signal

pub mod arena;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod shutdown;

pub use arena::{
    ActivateRequest, AdvanceRequest, Arena, ArenaError, AuditionReceipt, AuditionRequest,
    CreateSeasonRequest, DecisionRequest, GrantAdminRequest, JudgeRegistrationRequest,
    JudgeRequest, Me, PerformanceRequest, RedeemRequest, RegisterRequest, Registration,
    ScoreRequest, SeedQueueRequest, StageRequest,
};
pub use config::{NodeConfig, StorageBackend};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::ArenaMetrics;
pub use node::ArenaNode;
pub use shutdown::{ShutdownController, ShutdownSignal};
