//! Primitives - adaptive units attached to statements.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use system_rules::{Constructivity, MetricType, PrimitiveKind, PrimitiveMetrics, SystemState};

use crate::generation::{GenerationContext, RuleCatalog, StatementGenerator};

/// Feedback magnitude a primitive ignores by default.
pub const DEFAULT_ADAPTATION_THRESHOLD: f64 = 0.7;

/// Default smoothing factor for metric updates.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// What the controller hands a primitive when asking it to adapt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationContext {
    pub system_state: SystemState,
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
}

impl AdaptationContext {
    pub fn new(system_state: SystemState, cycle: u64) -> Self {
        Self {
            system_state,
            cycle,
            timestamp: Utc::now(),
        }
    }
}

/// Audit entry for one adaptation. Never replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRecord {
    pub timestamp: DateTime<Utc>,
    pub feedback: f64,
    pub context: AdaptationContext,
    /// Metrics as they were before this adaptation.
    pub previous_metrics: PrimitiveMetrics,
}

/// An adaptive unit owning one rule-based generator.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub name: String,
    pub description: String,
    kind: PrimitiveKind,
    metrics: PrimitiveMetrics,
    adaptation_threshold: f64,
    learning_rate: f64,
    adaptation_history: Vec<AdaptationRecord>,
    generator: StatementGenerator,
    constructivity: Option<Arc<Constructivity>>,
}

impl Primitive {
    /// Create a primitive, deriving its kind from the name.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let kind = PrimitiveKind::classify(&name);
        Self::with_kind(kind, name, description)
    }

    /// Create a primitive of an explicit kind.
    pub fn with_kind(
        kind: PrimitiveKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            metrics: PrimitiveMetrics::default(),
            adaptation_threshold: DEFAULT_ADAPTATION_THRESHOLD,
            learning_rate: DEFAULT_LEARNING_RATE,
            adaptation_history: Vec::new(),
            generator: RuleCatalog::builtin(kind).into_generator(),
            constructivity: None,
        }
    }

    /// The canonical primitive for a kind.
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        Self::with_kind(kind, kind.primitive_name(), kind.description())
    }

    /// Set the adaptation threshold.
    pub fn with_adaptation_threshold(mut self, threshold: f64) -> Self {
        self.adaptation_threshold = threshold;
        self
    }

    /// Set the learning rate, clamped into `[0, 1]`.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate.clamp(0.0, 1.0);
        self
    }

    /// Attach a node of the purpose tree.
    pub fn with_constructivity(mut self, constructivity: Arc<Constructivity>) -> Self {
        self.constructivity = Some(constructivity);
        self
    }

    /// Append extra rules after the built-in ones.
    pub fn with_extra_rules(mut self, catalog: RuleCatalog) -> Self {
        for rule in catalog.rules {
            self.generator.add_rule(rule);
        }
        self
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn metrics(&self) -> &PrimitiveMetrics {
        &self.metrics
    }

    pub fn adaptation_threshold(&self) -> f64 {
        self.adaptation_threshold
    }

    pub fn adaptation_history(&self) -> &[AdaptationRecord] {
        &self.adaptation_history
    }

    pub fn generator(&self) -> &StatementGenerator {
        &self.generator
    }

    pub fn constructivity(&self) -> Option<&Arc<Constructivity>> {
        self.constructivity.as_ref()
    }

    /// Whether feedback of this magnitude triggers adaptation.
    pub fn responds_to(&self, feedback: f64) -> bool {
        feedback.abs() > self.adaptation_threshold
    }

    /// React to feedback.
    ///
    /// Does nothing and returns `None` unless `|feedback|` exceeds the
    /// adaptation threshold. Otherwise records the adaptation, moves the
    /// metrics and asks the generator for a new statement.
    pub fn adapt<R: Rng + ?Sized>(
        &mut self,
        feedback: f64,
        context: &AdaptationContext,
        rng: &mut R,
    ) -> Option<String> {
        if !self.responds_to(feedback) {
            return None;
        }

        self.adaptation_history.push(AdaptationRecord {
            timestamp: Utc::now(),
            feedback,
            context: *context,
            previous_metrics: self.metrics,
        });

        let alpha = self.learning_rate;
        self.metrics.adaptation_rate =
            self.metrics.adaptation_rate * (1.0 - alpha) + feedback.abs() * alpha;

        for metric in MetricType::SCALED {
            let scaled = self.metrics.get(metric) * (1.0 + alpha * feedback);
            self.metrics.set(metric, scaled);
        }

        tracing::debug!(
            primitive = %self.name,
            kind = %self.kind,
            feedback,
            adaptation_rate = self.metrics.adaptation_rate,
            cycle = context.cycle,
            "Primitive adapted"
        );

        let generation_context = GenerationContext {
            feedback_score: feedback,
            system_state: context.system_state,
            adaptation_rate: self.metrics.adaptation_rate,
            cycle: context.cycle,
        };

        self.generator.generate(&generation_context, rng)
    }
}
