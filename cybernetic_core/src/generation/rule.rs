//! Generation rules - predicate-guarded template generators.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::GenerationContext;

/// Smallest weight a rule may carry.
pub const MIN_RULE_WEIGHT: f64 = 1e-6;

/// Largest weight a rule may carry.
pub const MAX_RULE_WEIGHT: f64 = 1e6;

/// An arbitrary predicate over the generation context.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&GenerationContext) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&GenerationContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn eval(&self, context: &GenerationContext) -> bool {
        (self.0)(context)
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A single condition a rule checks against the context.
///
/// Comparisons are strict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    FeedbackAbove { threshold: f64 },
    FeedbackBelow { threshold: f64 },
    StabilityBelow { threshold: f64 },
    StabilityAbove { threshold: f64 },
    AdaptationRateAbove { threshold: f64 },
    CycleAtLeast { cycle: u64 },
    Always,
    /// Holds when at least one inner condition holds.
    AnyOf { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
    /// Code-only escape hatch; cannot be serialized.
    #[serde(skip)]
    Custom(Predicate),
}

impl Condition {
    pub fn feedback_above(threshold: f64) -> Self {
        Condition::FeedbackAbove { threshold }
    }

    pub fn feedback_below(threshold: f64) -> Self {
        Condition::FeedbackBelow { threshold }
    }

    pub fn stability_below(threshold: f64) -> Self {
        Condition::StabilityBelow { threshold }
    }

    pub fn stability_above(threshold: f64) -> Self {
        Condition::StabilityAbove { threshold }
    }

    pub fn adaptation_rate_above(threshold: f64) -> Self {
        Condition::AdaptationRateAbove { threshold }
    }

    pub fn any_of(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::AnyOf {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&GenerationContext) -> bool + Send + Sync + 'static,
    {
        Condition::Custom(Predicate::new(f))
    }

    /// Evaluate against a context.
    pub fn holds(&self, context: &GenerationContext) -> bool {
        match self {
            Condition::FeedbackAbove { threshold } => context.feedback_score > *threshold,
            Condition::FeedbackBelow { threshold } => context.feedback_score < *threshold,
            Condition::StabilityBelow { threshold } => context.system_state.stability < *threshold,
            Condition::StabilityAbove { threshold } => context.system_state.stability > *threshold,
            Condition::AdaptationRateAbove { threshold } => context.adaptation_rate > *threshold,
            Condition::CycleAtLeast { cycle } => context.cycle >= *cycle,
            Condition::Always => true,
            Condition::AnyOf { conditions } => conditions.iter().any(|c| c.holds(context)),
            Condition::Not { condition } => !condition.holds(context),
            Condition::Custom(predicate) => predicate.eval(context),
        }
    }
}

/// A weighted, conditional template generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub templates: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Rule {
    /// Create an unconditional rule with weight 1.0 and no templates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            templates: Vec::new(),
            variables: BTreeMap::new(),
            weight: default_weight(),
        }
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    /// Add multiple templates.
    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.extend(templates.into_iter().map(Into::into));
        self
    }

    /// Set the candidate values of a placeholder.
    pub fn with_variable<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the selection weight, clamped into `[MIN_RULE_WEIGHT, MAX_RULE_WEIGHT]`.
    pub fn with_weight(mut self, weight: f64) -> Self {
        // max/min rather than clamp so NaN lands on the minimum
        self.weight = weight.max(MIN_RULE_WEIGHT).min(MAX_RULE_WEIGHT);
        self
    }

    /// True iff every condition holds. No conditions means always.
    pub fn should_apply(&self, context: &GenerationContext) -> bool {
        self.conditions.iter().all(|c| c.holds(context))
    }

    /// Pick a template uniformly and fill its placeholders.
    ///
    /// Rendering does not read the context yet.
    pub fn generate_statement<R: Rng + ?Sized>(
        &self,
        _context: &GenerationContext,
        rng: &mut R,
    ) -> String {
        match self.templates.choose(rng) {
            Some(template) => render_template(template, &self.variables, rng),
            None => String::new(),
        }
    }

    /// Placeholder names used by templates without a matching variable.
    pub fn unresolved_placeholders(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .templates
            .iter()
            .flat_map(|t| placeholders(t))
            .filter(|name| !self.variables.contains_key(*name))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

/// Names of `{name}` placeholders in order of appearance.
fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find(&['{', '}'][..]) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            Some(next_open) => rest = &after[next_open..],
            None => break,
        }
    }
    names
}

/// Substitute placeholders left to right.
///
/// Each distinct placeholder draws one value, reused for repeated
/// occurrences. Unknown placeholders and those with no candidates are kept
/// verbatim.
fn render_template<R: Rng + ?Sized>(
    template: &str,
    variables: &BTreeMap<String, Vec<String>>,
    rng: &mut R,
) -> String {
    let mut chosen: HashMap<&str, &str> = HashMap::new();
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find(&['{', '}'][..]) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                let value = match chosen.get(name).copied() {
                    Some(value) => Some(value),
                    None => {
                        let picked = variables
                            .get(name)
                            .and_then(|values| values.choose(rng))
                            .map(String::as_str);
                        if let Some(value) = picked {
                            chosen.insert(name, value);
                        }
                        picked
                    }
                };
                match value {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            Some(next_open) => {
                // Stray brace; keep it and resume at the next one
                output.push('{');
                output.push_str(&after[..next_open]);
                rest = &after[next_open..];
            }
            None => {
                output.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use system_rules::SystemState;

    fn context(feedback: f64, stability: f64, rate: f64) -> GenerationContext {
        GenerationContext {
            feedback_score: feedback,
            system_state: SystemState {
                stability,
                ..SystemState::default()
            },
            adaptation_rate: rate,
            cycle: 0,
        }
    }

    #[test]
    fn test_empty_conditions_apply() {
        let rule = Rule::new("open").with_template("anything");
        assert!(rule.should_apply(&context(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_all_conditions_required() {
        let rule = Rule::new("guarded")
            .with_condition(Condition::feedback_above(0.7))
            .with_condition(Condition::stability_below(0.8));

        assert!(rule.should_apply(&context(0.9, 0.5, 0.0)));
        assert!(!rule.should_apply(&context(0.9, 0.9, 0.0)));
        assert!(!rule.should_apply(&context(0.7, 0.5, 0.0)));
    }

    #[test]
    fn test_any_of_and_not() {
        let either = Condition::any_of([
            Condition::stability_below(0.6),
            Condition::adaptation_rate_above(0.5),
        ]);
        assert!(either.holds(&context(0.0, 0.5, 0.0)));
        assert!(either.holds(&context(0.0, 1.0, 0.6)));
        assert!(!either.holds(&context(0.0, 1.0, 0.1)));

        let negated = Condition::negate(Condition::Always);
        assert!(!negated.holds(&context(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_custom_condition() {
        let rule = Rule::new("late")
            .with_condition(Condition::custom(|ctx| ctx.cycle % 2 == 1))
            .with_template("odd cycle");

        let mut ctx = context(0.0, 1.0, 0.0);
        assert!(!rule.should_apply(&ctx));
        ctx.cycle = 3;
        assert!(rule.should_apply(&ctx));
    }

    #[test]
    fn test_render_substitutes_and_keeps_unknown() {
        let mut rng = StdRng::seed_from_u64(1);
        let rule = Rule::new("render")
            .with_template("Use {tool} on {target} with {missing}")
            .with_variable("tool", ["hammer"])
            .with_variable("target", ["nail"]);

        let text = rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng);
        assert_eq!(text, "Use hammer on nail with {missing}");
        assert_eq!(rule.unresolved_placeholders(), vec!["missing".to_string()]);
    }

    #[test]
    fn test_repeated_placeholder_reuses_value() {
        let mut rng = StdRng::seed_from_u64(9);
        let rule = Rule::new("repeat")
            .with_template("{x}-{x}")
            .with_variable("x", ["a", "b", "c", "d"]);

        for _ in 0..20 {
            let text = rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng);
            let (left, right) = text.split_once('-').unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_empty_candidates_stay_literal() {
        let mut rng = StdRng::seed_from_u64(3);
        let rule = Rule::new("empty")
            .with_template("Deploy {system}")
            .with_variable("system", Vec::<String>::new());

        assert_eq!(
            rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng),
            "Deploy {system}"
        );
    }

    #[test]
    fn test_stray_braces() {
        let mut rng = StdRng::seed_from_u64(3);
        let rule = Rule::new("braces")
            .with_template("a { b {v} c {")
            .with_variable("v", ["x"]);

        assert_eq!(
            rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng),
            "a { b x c {"
        );
    }

    #[test]
    fn test_no_templates_renders_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let rule = Rule::new("blank");
        assert_eq!(rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng), "");
    }

    #[test]
    fn test_template_choice_covers_all() {
        let mut rng = StdRng::seed_from_u64(11);
        let rule = Rule::new("choice").with_templates(["one", "two", "three"]);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(rule.generate_statement(&context(0.0, 1.0, 0.0), &mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_weight_clamping() {
        assert_eq!(Rule::new("a").with_weight(0.0).weight, MIN_RULE_WEIGHT);
        assert_eq!(Rule::new("b").with_weight(f64::NAN).weight, MIN_RULE_WEIGHT);
        assert_eq!(Rule::new("c").with_weight(f64::INFINITY).weight, MAX_RULE_WEIGHT);
        assert_eq!(Rule::new("d").with_weight(1.5).weight, 1.5);
    }

    #[test]
    fn test_custom_condition_not_serializable() {
        let rule = Rule::new("code_only").with_condition(Condition::custom(|_| true));
        assert!(serde_json::to_string(&rule).is_err());

        let rule = Rule::new("data").with_condition(Condition::feedback_above(0.7));
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"type\":\"feedback_above\""));
    }
}
