//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, storage) are abstracted behind traits. This
//! crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests. The node also
//! runs on [`NullStore`] when configured with in-memory storage.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStore;
