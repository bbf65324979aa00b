//! # Cybernetic Core
//!
//! The engine of the feedback loop. This crate builds on `system_rules`,
//! generates new statements from weighted conditional rules, and adapts
//! primitives in response to accumulated feedback.
//!
//! ## Core Components
//!
//! - **generation**: Rules, the weighted statement generator and the built-in rule catalog
//! - **primitive**: Adaptive units owning a generator and evolving metrics
//! - **statement**: Statements with recency-weighted feedback scores
//! - **system**: The cycle controller folding adaptations into system state
//!
//! ## Randomness
//!
//! Nothing in this crate reaches for a global RNG. Every call that draws
//! randomness takes `&mut R where R: rand::Rng`, and the controller owns a
//! seedable `StdRng`.

pub mod generation;
pub mod primitive;
pub mod statement;
pub mod system;

pub use generation::*;
pub use primitive::*;
pub use statement::*;
pub use system::*;
