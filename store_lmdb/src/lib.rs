//! LMDB storage backend for the arena.
//!
//! Implements all storage traits from `agt-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single
//! environment; values are bincode-encoded records. Every trait method runs
//! in exactly one LMDB transaction, which is what makes the conditional
//! operations (`take_challenge`, `advance_stage`, `replace_season_if`) atomic.

pub mod admin;
pub mod agent;
pub mod audition;
pub mod challenge;
pub mod environment;
pub mod error;
pub mod judge;
pub mod performance;
pub mod queue;
pub mod score;
pub mod season;

pub use environment::LmdbStore;
pub use error::LmdbError;
