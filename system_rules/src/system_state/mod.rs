//! Aggregate system state - the rolling health of the whole loop.

use serde::{Deserialize, Serialize};

/// Process-wide aggregate updated once per feedback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// In `[stability_floor, 1.0]`; decays with the magnitude of feedback.
    pub stability: f64,
    /// Non-negative moving average of adaptations per statement.
    pub complexity: f64,
    /// Adaptations per processed statement in the last cycle.
    pub adaptation_rate: f64,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            stability: 1.0,
            complexity: 0.0,
            adaptation_rate: 0.0,
        }
    }
}

/// Tunables for folding one cycle into the state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateDynamics {
    /// Fraction of `|average_feedback|` removed from stability per cycle.
    pub stability_sensitivity: f64,
    /// Lower bound for stability.
    pub stability_floor: f64,
    /// Share of the previous complexity kept each cycle.
    pub complexity_retention: f64,
    /// Weight of the new adaptations-per-statement sample.
    pub complexity_gain: f64,
}

impl Default for StateDynamics {
    fn default() -> Self {
        Self {
            stability_sensitivity: 0.1,
            stability_floor: 0.1,
            complexity_retention: 0.9,
            complexity_gain: 0.1,
        }
    }
}

/// Aggregates of one cycle needed to update the state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleOutcome {
    pub processed_statements: usize,
    pub adaptations: usize,
    pub average_feedback: f64,
    /// Size of the statement collection after the cycle finished.
    pub statement_count: usize,
}

impl SystemState {
    /// Create the initial state `{1.0, 0.0, 0.0}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle into the state.
    ///
    /// Stability only moves when something was processed. Complexity and
    /// adaptation rate always move, with denominators floored at one.
    /// Never panics, even with an inverted or NaN floor.
    pub fn apply_cycle(&mut self, outcome: &CycleOutcome, dynamics: &StateDynamics) {
        if outcome.processed_statements > 0 {
            let impact = outcome.average_feedback.abs();
            let decayed = self.stability * (1.0 - dynamics.stability_sensitivity * impact);
            self.stability = decayed.max(dynamics.stability_floor).min(1.0);
        }

        let complexity_factor = outcome.adaptations as f64 / outcome.statement_count.max(1) as f64;
        self.complexity = self.complexity * dynamics.complexity_retention
            + dynamics.complexity_gain * complexity_factor;

        self.adaptation_rate =
            outcome.adaptations as f64 / outcome.processed_statements.max(1) as f64;
    }

    /// Whether stability has dropped below the given threshold.
    pub fn is_unstable(&self, threshold: f64) -> bool {
        self.stability < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SystemState::new();
        assert_eq!(state.stability, 1.0);
        assert_eq!(state.complexity, 0.0);
        assert_eq!(state.adaptation_rate, 0.0);
    }

    #[test]
    fn test_apply_cycle() {
        let mut state = SystemState::new();
        let outcome = CycleOutcome {
            processed_statements: 5,
            adaptations: 5,
            average_feedback: 0.8,
            statement_count: 7,
        };

        state.apply_cycle(&outcome, &StateDynamics::default());

        assert!((state.stability - 0.92).abs() < 1e-12);
        assert_eq!(state.complexity, 0.1 * (5.0 / 7.0));
        assert_eq!(state.adaptation_rate, 1.0);
    }

    #[test]
    fn test_complexity_moving_average() {
        let mut state = SystemState::new();
        let outcome = CycleOutcome {
            processed_statements: 4,
            adaptations: 4,
            average_feedback: 0.0,
            statement_count: 4,
        };

        state.apply_cycle(&outcome, &StateDynamics::default());
        assert_eq!(state.complexity, 0.1);

        state.apply_cycle(&outcome, &StateDynamics::default());
        assert_eq!(state.complexity, 0.1 * 0.9 + 0.1);
    }

    #[test]
    fn test_inverted_floor_does_not_panic() {
        let outcome = CycleOutcome {
            processed_statements: 1,
            adaptations: 1,
            average_feedback: 0.9,
            statement_count: 1,
        };

        let mut state = SystemState::new();
        let dynamics = StateDynamics {
            stability_floor: 1.5,
            ..StateDynamics::default()
        };
        state.apply_cycle(&outcome, &dynamics);
        assert_eq!(state.stability, 1.0);

        let mut state = SystemState::new();
        let dynamics = StateDynamics {
            stability_floor: f64::NAN,
            ..StateDynamics::default()
        };
        state.apply_cycle(&outcome, &dynamics);
        assert!((state.stability - 0.91).abs() < 1e-12);
    }

    #[test]
    fn test_negative_feedback_also_decays_stability() {
        let mut state = SystemState::new();
        let outcome = CycleOutcome {
            processed_statements: 2,
            adaptations: 0,
            average_feedback: -0.5,
            statement_count: 2,
        };

        state.apply_cycle(&outcome, &StateDynamics::default());

        assert!((state.stability - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_stability_floor() {
        let mut state = SystemState::new();
        let outcome = CycleOutcome {
            processed_statements: 1,
            adaptations: 1,
            average_feedback: 9.0,
            statement_count: 1,
        };

        for _ in 0..50 {
            state.apply_cycle(&outcome, &StateDynamics::default());
        }

        assert_eq!(state.stability, 0.1);
        assert!(state.is_unstable(0.5));
    }

    #[test]
    fn test_empty_cycle_keeps_initial_state() {
        let mut state = SystemState::new();
        state.apply_cycle(&CycleOutcome::default(), &StateDynamics::default());
        assert_eq!(state, SystemState::new());
    }
}
