//! HTTP JSON API for the arena.
//!
//! Provides routes for:
//! - Wallet sign-in (challenge, session) and agent profiles
//! - Auditions, performances and judge scores
//! - Season administration: lifecycle, audition review, judges, the stage queue
//! - Admin management
//! - Health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use handlers::RpcState;
pub use server::{build_router, RpcServer};
