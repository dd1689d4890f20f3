//! Identity for the arena.
//!
//! - [`IdentityVerifier`] proves wallet ownership with single-use signed challenges
//! - [`SessionIssuer`] turns a proven wallet into a bearer credential
//! - [`AccessControl`] resolves a credential to a [`Principal`] and checks roles
//! - [`AgentRegistry`] keeps one agent profile per wallet

pub mod access;
pub mod agents;
pub mod challenge;
pub mod error;
pub mod session;

pub use access::{AccessControl, Principal};
pub use agents::{AgentProfile, AgentRegistry};
pub use challenge::{challenge_message, Challenge, IdentityVerifier};
pub use error::IdentityError;
pub use session::{bearer_token, SessionClaims, SessionGrant, SessionIssuer, AGENT_SESSION_PURPOSE};
