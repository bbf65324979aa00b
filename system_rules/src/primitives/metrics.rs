//! Adaptive metric definitions for primitives.

use serde::{Deserialize, Serialize};

/// Metric block carried by every primitive. All values live in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveMetrics {
    pub reliability: f64,
    pub complexity: f64,
    pub maintainability: f64,
    /// Exponential moving average of the feedback magnitude seen so far.
    pub adaptation_rate: f64,
}

impl Default for PrimitiveMetrics {
    fn default() -> Self {
        Self {
            reliability: 0.9,
            complexity: 0.6,
            maintainability: 0.8,
            adaptation_rate: 0.0,
        }
    }
}

/// Metric selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Reliability,
    Complexity,
    Maintainability,
    AdaptationRate,
}

impl MetricType {
    /// The metrics scaled by feedback on every adaptation.
    pub const SCALED: [MetricType; 3] = [
        MetricType::Reliability,
        MetricType::Complexity,
        MetricType::Maintainability,
    ];
}

impl PrimitiveMetrics {
    /// Read a single metric.
    pub fn get(&self, metric: MetricType) -> f64 {
        match metric {
            MetricType::Reliability => self.reliability,
            MetricType::Complexity => self.complexity,
            MetricType::Maintainability => self.maintainability,
            MetricType::AdaptationRate => self.adaptation_rate,
        }
    }

    /// Write a single metric, clamped into `[0, 1]`.
    pub fn set(&mut self, metric: MetricType, value: f64) {
        let value = value.clamp(0.0, 1.0);
        match metric {
            MetricType::Reliability => self.reliability = value,
            MetricType::Complexity => self.complexity = value,
            MetricType::Maintainability => self.maintainability = value,
            MetricType::AdaptationRate => self.adaptation_rate = value,
        }
    }
}
