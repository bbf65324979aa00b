//! Primitive kinds and their adaptive metrics.

mod metrics;

pub use metrics::*;

use serde::{Deserialize, Serialize};

/// The closed set of primitive behaviours.
///
/// A kind is assigned once when a primitive is built and decides which rule
/// set its generator receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Efficiency,
    Security,
    Reliability,
    Adaptation,
    #[default]
    Generic,
}

impl PrimitiveKind {
    /// Keyed kinds in classification priority order.
    const KEYED: [PrimitiveKind; 4] = [
        PrimitiveKind::Efficiency,
        PrimitiveKind::Security,
        PrimitiveKind::Reliability,
        PrimitiveKind::Adaptation,
    ];

    /// All kinds, generic last.
    pub fn all() -> [PrimitiveKind; 5] {
        [
            PrimitiveKind::Efficiency,
            PrimitiveKind::Security,
            PrimitiveKind::Reliability,
            PrimitiveKind::Adaptation,
            PrimitiveKind::Generic,
        ]
    }

    /// The lowercase keyword that selects this kind, if any.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Efficiency => Some("efficiency"),
            PrimitiveKind::Security => Some("security"),
            PrimitiveKind::Reliability => Some("reliability"),
            PrimitiveKind::Adaptation => Some("adaptation"),
            PrimitiveKind::Generic => None,
        }
    }

    /// Classify free text by case-insensitive keyword.
    ///
    /// The first keyword found wins, checked in the order efficiency,
    /// security, reliability, adaptation. Text with none of them is generic.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self::KEYED
            .into_iter()
            .find(|kind| kind.keyword().is_some_and(|kw| lowered.contains(kw)))
            .unwrap_or(PrimitiveKind::Generic)
    }

    /// Canonical primitive name for this kind.
    pub fn primitive_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Efficiency => "Efficiency_Primitive",
            PrimitiveKind::Security => "Security_Primitive",
            PrimitiveKind::Reliability => "Reliability_Primitive",
            PrimitiveKind::Adaptation => "Adaptation_Primitive",
            PrimitiveKind::Generic => "Generic_Primitive",
        }
    }

    /// Canonical primitive description for this kind.
    pub fn description(&self) -> &'static str {
        match self {
            PrimitiveKind::Efficiency => "Optimizes system efficiency",
            PrimitiveKind::Security => "Enhances system security",
            PrimitiveKind::Reliability => "Improves system reliability",
            PrimitiveKind::Adaptation => "Handles system adaptation",
            PrimitiveKind::Generic => "Handles general system operations",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PrimitiveKind::Efficiency => "efficiency",
            PrimitiveKind::Security => "security",
            PrimitiveKind::Reliability => "reliability",
            PrimitiveKind::Adaptation => "adaptation",
            PrimitiveKind::Generic => "generic",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(
            PrimitiveKind::classify("Improve system EFFICIENCY through caching"),
            PrimitiveKind::Efficiency
        );
        assert_eq!(
            PrimitiveKind::classify("Enhance security protocols"),
            PrimitiveKind::Security
        );
        assert_eq!(
            PrimitiveKind::classify("Implement reliability measures"),
            PrimitiveKind::Reliability
        );
        assert_eq!(
            PrimitiveKind::classify("Tune adaptation thresholds"),
            PrimitiveKind::Adaptation
        );
    }

    #[test]
    fn test_classify_generic() {
        // "adaptive" is not the "adaptation" keyword
        assert_eq!(
            PrimitiveKind::classify("Enable adaptive responses to system changes"),
            PrimitiveKind::Generic
        );
        assert_eq!(PrimitiveKind::classify(""), PrimitiveKind::Generic);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(
            PrimitiveKind::classify("security before efficiency"),
            PrimitiveKind::Efficiency
        );
        assert_eq!(
            PrimitiveKind::classify("adaptation and reliability"),
            PrimitiveKind::Reliability
        );
    }

    #[test]
    fn test_names_round_trip_through_classify() {
        for kind in PrimitiveKind::all() {
            assert_eq!(PrimitiveKind::classify(kind.primitive_name()), kind);
        }
    }
}
