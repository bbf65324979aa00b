//! Statements - the textual units feedback is attached to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use system_rules::{FeedbackEntry, FeedbackType};
use uuid::Uuid;

use crate::primitive::Primitive;

/// Identifies one statement across cycles, including generated ones.
///
/// Content is not unique, so the generated-statement log refers to
/// statements by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementId(pub Uuid);

impl StatementId {
    /// Create a new random statement ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StatementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StatementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A statement with its primitives and feedback history.
///
/// Equality and hashing look at `content` only.
#[derive(Debug, Clone)]
pub struct Statement {
    pub id: StatementId,
    pub content: String,
    pub system_primitives: Vec<Primitive>,
    pub timestamp: DateTime<Utc>,
    feedback_history: Vec<FeedbackEntry>,
    /// Content of the statement this one was generated from.
    pub generated_from: Option<String>,
}

impl Statement {
    /// Create a statement with no primitives and no feedback.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: StatementId::new(),
            content: content.into(),
            system_primitives: Vec::new(),
            timestamp: Utc::now(),
            feedback_history: Vec::new(),
            generated_from: None,
        }
    }

    /// Create a statement generated from another statement's content.
    pub fn generated_from(content: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::new(content).with_origin(origin)
    }

    /// Set the originating content.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.generated_from = Some(origin.into());
        self
    }

    /// Attach a primitive.
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.system_primitives.push(primitive);
        self
    }

    /// Record a piece of feedback.
    pub fn add_feedback(&mut self, feedback_type: FeedbackType, strength: f64) {
        self.feedback_history
            .push(FeedbackEntry::new(feedback_type, strength));
    }

    pub fn feedback_history(&self) -> &[FeedbackEntry] {
        &self.feedback_history
    }

    pub fn is_generated(&self) -> bool {
        self.generated_from.is_some()
    }

    /// Recency-weighted feedback score.
    ///
    /// Entry `i` of `n` weighs `exp(i / n)`, so the weight grows with the
    /// absolute position in the history. Neutral entries add weight but no
    /// signal. An empty history scores `0.0`.
    pub fn feedback_score(&self) -> f64 {
        let n = self.feedback_history.len();
        if n == 0 {
            return 0.0;
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (i, entry) in self.feedback_history.iter().enumerate() {
            let weight = (i as f64 / n as f64).exp();
            weighted_sum += entry.signed_strength() * weight;
            total_weight += weight;
        }

        weighted_sum / total_weight
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for Statement {}

impl std::hash::Hash for Statement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.content.hash(state);
    }
}
