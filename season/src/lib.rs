//! Season administration for the arena.
//!
//! A season walks a forward-only phase order (draft, auditions, episode 1,
//! voting, episode 2, closed). Activation freezes the wall-clock windows
//! that gate audition submission. Accepted auditions make an agent eligible
//! for the stage; the judge roster decides who may score.

pub mod audition;
pub mod error;
pub mod judges;
pub mod lifecycle;

pub use audition::{AuditionGate, AuditionSubmission};
pub use error::SeasonError;
pub use judges::JudgeRoster;
pub use lifecycle::{compute_windows, SeasonLifecycle};
