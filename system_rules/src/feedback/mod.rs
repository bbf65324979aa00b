//! Feedback polarity and history entries.

use serde::{Deserialize, Serialize};

/// Polarity of a single piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Positive,
    Negative,
    /// Counts toward the weight total but contributes nothing.
    Neutral,
}

impl FeedbackType {
    /// Sign applied to the strength of an entry.
    pub fn sign(&self) -> f64 {
        match self {
            FeedbackType::Positive => 1.0,
            FeedbackType::Negative => -1.0,
            FeedbackType::Neutral => 0.0,
        }
    }
}

/// One recorded feedback event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub feedback_type: FeedbackType,
    /// Usually in `[0, 1]`; not enforced.
    pub strength: f64,
}

impl FeedbackEntry {
    pub fn new(feedback_type: FeedbackType, strength: f64) -> Self {
        Self {
            feedback_type,
            strength,
        }
    }

    pub fn positive(strength: f64) -> Self {
        Self::new(FeedbackType::Positive, strength)
    }

    pub fn negative(strength: f64) -> Self {
        Self::new(FeedbackType::Negative, strength)
    }

    pub fn neutral(strength: f64) -> Self {
        Self::new(FeedbackType::Neutral, strength)
    }

    /// Signed strength of this entry.
    pub fn signed_strength(&self) -> f64 {
        self.feedback_type.sign() * self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_strength() {
        assert_eq!(FeedbackEntry::positive(0.8).signed_strength(), 0.8);
        assert_eq!(FeedbackEntry::negative(0.6).signed_strength(), -0.6);
        assert_eq!(FeedbackEntry::neutral(0.9).signed_strength(), 0.0);
    }

    #[test]
    fn test_feedback_type_serde() {
        let json = serde_json::to_string(&FeedbackType::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
