//! # System Rules
//!
//! The "rulebook" crate - holds the vocabulary every part of the cybernetic
//! engine agrees on: primitive kinds and their metrics, feedback polarity,
//! the aggregate system state, the purpose configuration tree and the engine
//! configuration. This crate contains no generation or adaptation logic.

pub mod config;
pub mod feedback;
pub mod primitives;
pub mod purpose;
pub mod system_state;

pub use config::*;
pub use feedback::*;
pub use primitives::*;
pub use purpose::*;
pub use system_state::*;
