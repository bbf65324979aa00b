//! Rule catalog - built-in rule sets per primitive kind and TOML-defined rules.

use serde::{Deserialize, Serialize};
use system_rules::PrimitiveKind;
use thiserror::Error;

use super::{Condition, Rule, StatementGenerator, MAX_RULE_WEIGHT, MIN_RULE_WEIGHT};

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule has an empty name")]
    EmptyName,

    #[error("rule '{rule}' has invalid weight {weight}")]
    InvalidWeight { rule: String, weight: f64 },

    #[error("rule '{rule}' has no templates")]
    NoTemplates { rule: String },
}

/// A validated, ordered list of rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCatalog {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Parse `[[rules]]` tables from TOML and validate each rule.
    ///
    /// ```toml
    /// [[rules]]
    /// name = "cooling"
    /// weight = 2.0
    /// templates = ["Cool the {part}"]
    /// variables = { part = ["core", "rack"] }
    /// conditions = [{ type = "feedback_above", threshold = 0.8 }]
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, RuleError> {
        let catalog: RuleCatalog = toml::from_str(content)?;
        for rule in &catalog.rules {
            validate_rule(rule)?;
        }
        Ok(catalog)
    }

    /// The built-in rules for a primitive kind.
    pub fn builtin(kind: PrimitiveKind) -> Self {
        Self {
            rules: builtin_rules(kind),
        }
    }

    /// Append another catalog's rules after this one's.
    pub fn extend(&mut self, other: RuleCatalog) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_generator(self) -> StatementGenerator {
        StatementGenerator::with_rules(self.rules)
    }
}

/// Check a rule that did not come through the builder.
pub fn validate_rule(rule: &Rule) -> Result<(), RuleError> {
    if rule.name.trim().is_empty() {
        return Err(RuleError::EmptyName);
    }
    if !(MIN_RULE_WEIGHT..=MAX_RULE_WEIGHT).contains(&rule.weight) {
        return Err(RuleError::InvalidWeight {
            rule: rule.name.clone(),
            weight: rule.weight,
        });
    }
    if rule.templates.is_empty() {
        return Err(RuleError::NoTemplates {
            rule: rule.name.clone(),
        });
    }
    Ok(())
}

/// Rule sets by kind.
///
/// Efficiency and security rules only exist on their own kinds. Reliability
/// primitives always carry the reliability rule; every other kind gets it
/// only once stability drops below 0.6. The adaptation rule is shared.
pub fn builtin_rules(kind: PrimitiveKind) -> Vec<Rule> {
    let mut rules = Vec::new();

    match kind {
        PrimitiveKind::Efficiency => {
            rules.push(efficiency_improvement());
            rules.push(reliability_improvement().with_condition(Condition::stability_below(0.6)));
        }
        PrimitiveKind::Security => {
            rules.push(security_enhancement());
            rules.push(reliability_improvement().with_condition(Condition::stability_below(0.6)));
        }
        PrimitiveKind::Reliability => {
            rules.push(reliability_improvement());
        }
        PrimitiveKind::Adaptation | PrimitiveKind::Generic => {
            rules.push(reliability_improvement().with_condition(Condition::stability_below(0.6)));
        }
    }

    rules.push(adaptation_improvement());
    rules
}

fn efficiency_improvement() -> Rule {
    Rule::new("efficiency_improvement")
        .with_condition(Condition::feedback_above(0.7))
        .with_templates([
            "Optimize {resource} allocation using {algorithm}",
            "Implement {technique} for improved {aspect} efficiency",
            "Deploy {strategy} to enhance {resource} utilization",
        ])
        .with_variable("resource", ["CPU", "memory", "network", "storage", "compute"])
        .with_variable(
            "algorithm",
            ["adaptive algorithms", "machine learning", "predictive models", "dynamic allocation"],
        )
        .with_variable(
            "technique",
            ["load balancing", "caching", "parallel processing", "resource pooling"],
        )
        .with_variable("aspect", ["system", "runtime", "operational", "resource"])
        .with_variable(
            "strategy",
            [
                "automated scaling",
                "dynamic provisioning",
                "intelligent routing",
                "adaptive optimization",
            ],
        )
        .with_weight(1.5)
}

fn security_enhancement() -> Rule {
    Rule::new("security_enhancement")
        .with_condition(Condition::stability_below(0.8))
        .with_templates([
            "Implement {security_measure} to protect against {threat}",
            "Enhance {component} security using {technique}",
            "Deploy {security_system} for improved {protection_type}",
        ])
        .with_variable(
            "security_measure",
            ["encryption", "authentication", "access control", "intrusion detection"],
        )
        .with_variable(
            "threat",
            [
                "unauthorized access",
                "data breaches",
                "malicious attacks",
                "system vulnerabilities",
            ],
        )
        .with_variable("component", ["network", "data", "system", "application"])
        .with_variable(
            "technique",
            [
                "AI-powered monitoring",
                "blockchain",
                "zero-trust architecture",
                "behavioral analysis",
            ],
        )
        .with_variable(
            "security_system",
            [
                "anomaly detection",
                "threat prevention",
                "security validation",
                "compliance monitoring",
            ],
        )
        .with_variable(
            "protection_type",
            ["data protection", "system security", "access management", "threat prevention"],
        )
        .with_weight(1.2)
}

fn reliability_improvement() -> Rule {
    Rule::new("reliability_improvement")
        .with_templates([
            "Implement {mechanism} for improved {aspect} reliability",
            "Deploy {system} to ensure {component} stability",
            "Enhance {service} using {technique} for better reliability",
        ])
        .with_variable(
            "mechanism",
            ["failover", "redundancy", "load distribution", "health monitoring"],
        )
        .with_variable("aspect", ["system", "service", "operational", "component"])
        .with_variable(
            "system",
            [
                "automated recovery",
                "fault tolerance",
                "service resilience",
                "stability control",
            ],
        )
        .with_variable(
            "component",
            ["critical services", "core functions", "system components", "key operations"],
        )
        .with_variable(
            "service",
            ["system monitoring", "error handling", "performance tracking", "health checks"],
        )
        .with_variable(
            "technique",
            [
                "predictive maintenance",
                "automated recovery",
                "distributed redundancy",
                "adaptive failover",
            ],
        )
        .with_weight(1.0)
}

fn adaptation_improvement() -> Rule {
    Rule::new("adaptation_improvement")
        .with_condition(Condition::adaptation_rate_above(0.5))
        .with_templates([
            "Implement {adaptation_type} for {component} adaptation",
            "Enhance {aspect} using {technique} adaptation",
            "Deploy {system} for improved {target} adaptability",
        ])
        .with_variable(
            "adaptation_type",
            ["dynamic", "intelligent", "automated", "predictive"],
        )
        .with_variable("component", ["system", "service", "resource", "process"])
        .with_variable("aspect", ["performance", "efficiency", "reliability", "operation"])
        .with_variable(
            "technique",
            ["machine learning", "feedback-driven", "context-aware", "adaptive"],
        )
        .with_variable(
            "system",
            [
                "learning algorithms",
                "adaptation mechanisms",
                "dynamic controls",
                "adaptive systems",
            ],
        )
        .with_variable("target", ["system", "operational", "performance", "resource"])
        .with_weight(0.8)
}
