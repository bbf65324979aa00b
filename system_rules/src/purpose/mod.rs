//! Purpose tree - the static configuration chain behind purpose cycles.
//!
//! The chain is built once and shared read-only:
//! - **Constructivity**: how buildable a primitive is
//! - **Qualification**: whether that constructivity is good enough
//! - **SemanticCorrelation**: a declared correlation score
//! - **ManifestPurpose**: the objectives new statements are derived from
//!
//! Every link is an `Arc`, so many primitives can point at the same subtree
//! without any node ever referring back up the chain.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mean of a set of named scores, `0.0` when empty.
fn mean_score(scores: &[(String, f64)]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|(_, v)| v).sum::<f64>() / scores.len() as f64
}

fn named(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// A single objective with its priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub name: String,
    pub priority: f64,
}

impl Objective {
    pub fn new(name: impl Into<String>, priority: f64) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }

    /// Human-readable form of the name (`snake_case` to words).
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// The manifest purpose of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestPurpose {
    pub purpose: String,
    /// Ordered; generation follows this order.
    pub objectives: Vec<Objective>,
}

impl ManifestPurpose {
    /// Create a purpose with the default objectives.
    pub fn new(purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            objectives: vec![
                Objective::new("system_optimization", 0.9),
                Objective::new("reliability_improvement", 0.85),
                Objective::new("security_enhancement", 0.95),
            ],
        }
    }

    /// Replace the objectives.
    pub fn with_objectives(mut self, objectives: impl IntoIterator<Item = Objective>) -> Self {
        self.objectives = objectives.into_iter().collect();
        self
    }

    /// Statement texts for every objective with `priority > threshold`.
    pub fn generate_statements(&self, threshold: f64) -> Vec<String> {
        self.objectives
            .iter()
            .filter(|o| o.priority > threshold)
            .map(|o| format!("Implement {} with priority {}", o.label(), o.priority))
            .collect()
    }
}

/// Declared semantic correlation. Not computed from content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticCorrelation {
    pub correlation_strength: f64,
    pub correlations: Vec<(String, f64)>,
    pub manifest_purpose: Option<Arc<ManifestPurpose>>,
}

impl SemanticCorrelation {
    pub fn new(correlation_strength: f64) -> Self {
        Self {
            correlation_strength,
            correlations: named(&[
                ("context_relevance", 0.85),
                ("semantic_consistency", 0.9),
                ("purpose_alignment", 0.95),
            ]),
            manifest_purpose: None,
        }
    }

    pub fn with_correlations(mut self, correlations: &[(&str, f64)]) -> Self {
        self.correlations = named(correlations);
        self
    }

    pub fn with_purpose(mut self, purpose: Arc<ManifestPurpose>) -> Self {
        self.manifest_purpose = Some(purpose);
        self
    }

    /// Mean of the declared correlations.
    pub fn correlate(&self) -> f64 {
        mean_score(&self.correlations)
    }
}

/// Qualification gate for constructivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    pub criteria: Vec<String>,
    pub scores: Vec<(String, f64)>,
    pub threshold: f64,
    pub semantic_correlation: Option<Arc<SemanticCorrelation>>,
}

impl Qualification {
    /// Create a qualification scoring every criterion at 0.8.
    pub fn new<I, S>(criteria: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let criteria: Vec<String> = criteria.into_iter().map(Into::into).collect();
        let scores = criteria.iter().map(|c| (c.clone(), 0.8)).collect();
        Self {
            criteria,
            scores,
            threshold: 0.7,
            semantic_correlation: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_scores(mut self, scores: &[(&str, f64)]) -> Self {
        self.scores = named(scores);
        self
    }

    pub fn with_correlation(mut self, correlation: Arc<SemanticCorrelation>) -> Self {
        self.semantic_correlation = Some(correlation);
        self
    }

    /// Mean score must reach the threshold, and so must the constructivity level.
    ///
    /// A qualification without scores never qualifies.
    pub fn qualify(&self, constructivity: &Constructivity) -> bool {
        !self.scores.is_empty()
            && mean_score(&self.scores) >= self.threshold
            && constructivity.level >= self.threshold
    }
}

/// How constructible a primitive is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructivity {
    /// 0.0 to 1.0.
    pub level: f64,
    pub factors: Vec<(String, f64)>,
    pub qualification: Option<Arc<Qualification>>,
}

impl Constructivity {
    pub fn new(level: f64) -> Self {
        Self {
            level,
            factors: named(&[
                ("implementation_feasibility", 0.9),
                ("resource_availability", 0.7),
                ("technical_complexity", 0.6),
            ]),
            qualification: None,
        }
    }

    pub fn with_factors(mut self, factors: &[(&str, f64)]) -> Self {
        self.factors = named(factors);
        self
    }

    pub fn with_qualification(mut self, qualification: Arc<Qualification>) -> Self {
        self.qualification = Some(qualification);
        self
    }

    /// Mean of the constructivity factors.
    pub fn evaluate(&self) -> f64 {
        mean_score(&self.factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Arc<Constructivity> {
        let purpose = Arc::new(
            ManifestPurpose::new("Build a robust and efficient cybernetic system").with_objectives([
                Objective::new("system_reliability", 0.95),
                Objective::new("performance_optimization", 0.9),
                Objective::new("security_hardening", 0.85),
            ]),
        );
        let correlation = Arc::new(SemanticCorrelation::new(0.9).with_purpose(purpose));
        let qualification = Arc::new(
            Qualification::new(["reliability", "performance", "security"])
                .with_threshold(0.75)
                .with_scores(&[("reliability", 0.9), ("performance", 0.85), ("security", 0.95)])
                .with_correlation(correlation),
        );
        Arc::new(Constructivity::new(0.9).with_qualification(qualification))
    }

    #[test]
    fn test_constructivity_evaluate() {
        let constructivity = Constructivity::new(0.85);
        assert!((constructivity.evaluate() - (0.9 + 0.7 + 0.6) / 3.0).abs() < 1e-12);

        let empty = Constructivity::new(0.5).with_factors(&[]);
        assert_eq!(empty.evaluate(), 0.0);
    }

    #[test]
    fn test_qualification_defaults() {
        let qualification = Qualification::new(["speed", "resource_usage"]);
        assert_eq!(qualification.scores.len(), 2);
        assert_eq!(qualification.threshold, 0.7);

        assert!(qualification.qualify(&Constructivity::new(0.85)));
        assert!(!qualification.qualify(&Constructivity::new(0.5)));
    }

    #[test]
    fn test_qualification_low_scores() {
        let qualification = Qualification::new(["a"]).with_scores(&[("a", 0.4)]);
        assert!(!qualification.qualify(&Constructivity::new(1.0)));

        let empty = Qualification::new(Vec::<String>::new());
        assert!(!empty.qualify(&Constructivity::new(1.0)));
    }

    #[test]
    fn test_correlate() {
        let correlation = SemanticCorrelation::new(0.9);
        assert!((correlation.correlate() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_generate_statements_threshold() {
        let purpose = ManifestPurpose::new("Keep the lights on");

        let high = purpose.generate_statements(0.8);
        assert_eq!(
            high,
            vec![
                "Implement system optimization with priority 0.9".to_string(),
                "Implement reliability improvement with priority 0.85".to_string(),
                "Implement security enhancement with priority 0.95".to_string(),
            ]
        );

        let strict = purpose.generate_statements(0.9);
        assert_eq!(strict, vec!["Implement security enhancement with priority 0.95".to_string()]);
    }

    #[test]
    fn test_tree_walk() {
        let constructivity = sample_tree();
        let qualification = constructivity.qualification.as_ref().unwrap();
        assert!(qualification.qualify(&constructivity));

        let correlation = qualification.semantic_correlation.as_ref().unwrap();
        let purpose = correlation.manifest_purpose.as_ref().unwrap();
        assert_eq!(purpose.generate_statements(0.8).len(), 3);
    }

    #[test]
    fn test_shared_subtree() {
        let constructivity = sample_tree();
        let qualification = constructivity.qualification.clone().unwrap();

        let sibling = Constructivity::new(0.8).with_qualification(qualification.clone());
        assert!(Arc::ptr_eq(
            sibling.qualification.as_ref().unwrap(),
            constructivity.qualification.as_ref().unwrap()
        ));
    }
}
