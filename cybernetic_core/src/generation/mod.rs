//! Statement generation - weighted selection over conditional rules.
//!
//! Generation works as follows:
//! 1. **Filtering**: Keep the rules whose conditions all hold for the context
//! 2. **Weighing**: Sum the weights of the applicable rules
//! 3. **Selection**: Draw `r` in `[0, total)` and walk the cumulative weights
//! 4. **Rendering**: Fill the chosen rule's template with its variables

mod catalog;
mod rule;

pub use catalog::*;
pub use rule::*;

use rand::Rng;
use serde::{Deserialize, Serialize};
use system_rules::SystemState;

/// Everything a rule condition may look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationContext {
    /// Feedback that triggered the adaptation.
    pub feedback_score: f64,
    /// System state at the start of the cycle.
    pub system_state: SystemState,
    /// The primitive's adaptation rate after the update.
    pub adaptation_rate: f64,
    pub cycle: u64,
}

/// Holds rules and turns a context into (maybe) a new statement.
#[derive(Debug, Clone, Default)]
pub struct StatementGenerator {
    rules: Vec<Rule>,
}

impl StatementGenerator {
    /// Create a generator with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from rules, keeping their order.
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Append a rule. Later rules lose ties.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// All rules in insertion order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules whose conditions all hold, in insertion order.
    pub fn applicable_rules(&self, context: &GenerationContext) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.should_apply(context))
            .collect()
    }

    /// Weighted choice among the applicable rules.
    ///
    /// Returns `None` only when nothing applies. Each applicable rule is picked
    /// with probability `weight / total_weight`.
    pub fn select_rule<R: Rng + ?Sized>(
        &self,
        context: &GenerationContext,
        rng: &mut R,
    ) -> Option<&Rule> {
        let applicable = self.applicable_rules(context);
        let last = *applicable.last()?;

        let total_weight: f64 = applicable.iter().map(|rule| rule.weight).sum();
        if !(total_weight.is_finite() && total_weight > 0.0) {
            tracing::warn!(total_weight, "Degenerate rule weights, taking first applicable rule");
            return applicable.first().copied();
        }
        let draw = rng.gen_range(0.0..total_weight);

        let mut cumulative = 0.0;
        for rule in applicable.iter().copied() {
            cumulative += rule.weight;
            if cumulative >= draw {
                return Some(rule);
            }
        }

        // Rounding can leave the draw just past the final cumulative sum
        Some(last)
    }

    /// Generate statement text, or `None` when no rule applies.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        context: &GenerationContext,
        rng: &mut R,
    ) -> Option<String> {
        let rule = self.select_rule(context, rng)?;
        tracing::debug!(rule = %rule.name, cycle = context.cycle, "Selected generation rule");
        Some(rule.generate_statement(context, rng))
    }
}
