//! Cybernetic system - the cycle controller.
//!
//! A feedback cycle works as follows:
//! 1. **Snapshot**: Fix the set of statements to visit
//! 2. **Scoring**: Compute each statement's feedback score
//! 3. **Adaptation**: Primitives of strongly scored statements adapt
//! 4. **Emission**: Generated text becomes new statements
//! 5. **Folding**: Cycle aggregates update the system state

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use system_rules::{
    ConfigError, CycleOutcome, EngineConfig, ManifestPurpose, PrimitiveKind, PrimitiveMetrics,
    SystemState,
};

use crate::primitive::{AdaptationContext, Primitive};
use crate::statement::{Statement, StatementId};

/// Result of one feedback cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CycleMetrics {
    pub cycle: u64,
    pub processed_statements: usize,
    /// Adapt calls made, whether or not they produced text.
    pub adaptations: usize,
    pub generated_statements: usize,
    pub average_feedback: f64,
    /// Primitive name -> metrics after its last adapt call this cycle.
    pub primitive_metrics: BTreeMap<String, PrimitiveMetrics>,
}

/// Result of one purpose cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PurposeCycleMetrics {
    pub processed_statements: usize,
    pub generated_statements: usize,
    /// Sum of correlations over qualifying primitives, per processed statement.
    pub average_correlation: f64,
    /// Mean constructivity over primitives that carry one.
    pub average_constructivity: f64,
}

/// A statement created by the system itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStatement {
    pub cycle: u64,
    pub statement: StatementId,
}

/// Owns statements and system state and runs the cycles.
pub struct CyberneticSystem {
    config: EngineConfig,
    statements: Vec<Statement>,
    contents: HashSet<String>,
    system_state: SystemState,
    cycle: u64,
    generated: Vec<GeneratedStatement>,
    manifest_purpose: Option<Arc<ManifestPurpose>>,
    rng: StdRng,
}

impl Default for CyberneticSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CyberneticSystem {
    /// Create a system with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a system with the given configuration.
    ///
    /// An invalid configuration is replaced by the defaults, keeping its
    /// seed. Uses `config.seed` for the RNG when present, entropy otherwise.
    pub fn with_config(config: EngineConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected engine config, using defaults");
                EngineConfig {
                    seed: config.seed,
                    ..EngineConfig::default()
                }
            }
        };
        Self::build(config)
    }

    /// Validate the configuration, then create the system.
    pub fn try_with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            statements: Vec::new(),
            contents: HashSet::new(),
            system_state: SystemState::default(),
            cycle: 0,
            generated: Vec::new(),
            manifest_purpose: None,
            rng,
        }
    }

    /// Create a default-configured system with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn system_state(&self) -> &SystemState {
        &self.system_state
    }

    /// Index of the next cycle to run.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn statements_mut(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.statements.iter_mut()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn get_statement(&self, id: StatementId) -> Option<&Statement> {
        self.statements.iter().find(|s| s.id == id)
    }

    pub fn get_statement_mut(&mut self, id: StatementId) -> Option<&mut Statement> {
        self.statements.iter_mut().find(|s| s.id == id)
    }

    /// Whether a statement with this exact content exists.
    pub fn contains_content(&self, content: &str) -> bool {
        self.contents.contains(content)
    }

    /// The purpose adopted by the last purpose cycle.
    pub fn manifest_purpose(&self) -> Option<&Arc<ManifestPurpose>> {
        self.manifest_purpose.as_ref()
    }

    /// Every generated statement with the cycle that produced it.
    pub fn generated_statements(&self) -> impl Iterator<Item = (u64, &Statement)> {
        self.generated.iter().filter_map(|g| {
            self.get_statement(g.statement)
                .map(|statement| (g.cycle, statement))
        })
    }

    /// Statements generated during a given cycle.
    pub fn generated_in_cycle(&self, cycle: u64) -> Vec<&Statement> {
        self.generated_statements()
            .filter(|(c, _)| *c == cycle)
            .map(|(_, s)| s)
            .collect()
    }

    /// Add a statement with a primitive chosen by keyword.
    pub fn add_statement(&mut self, content: impl Into<String>) -> &mut Statement {
        let content = content.into();
        let primitive = self.primitive_for(&content);
        self.push_statement(Statement::new(content).with_primitive(primitive))
    }

    /// Add a fully built statement as-is.
    pub fn add_prepared_statement(&mut self, statement: Statement) -> &mut Statement {
        self.push_statement(statement)
    }

    /// Build the keyword-classified primitive for some content.
    pub fn primitive_for(&self, content: &str) -> Primitive {
        Primitive::for_kind(PrimitiveKind::classify(content))
            .with_adaptation_threshold(self.config.adaptation_threshold)
            .with_learning_rate(self.config.learning_rate)
    }

    fn push_statement(&mut self, statement: Statement) -> &mut Statement {
        self.contents.insert(statement.content.clone());
        let index = self.statements.len();
        self.statements.push(statement);
        &mut self.statements[index]
    }

    /// Add a statement produced during `cycle`, honoring deduplication.
    fn emit_generated(&mut self, cycle: u64, content: String, origin: &str) -> bool {
        if content.is_empty() {
            return false;
        }
        if self.config.deduplicate_generated && self.contains_content(&content) {
            tracing::debug!(content = %content, "Skipping duplicate generated statement");
            return false;
        }

        let primitive = self.primitive_for(&content);
        let statement = Statement::generated_from(content, origin).with_primitive(primitive);
        let id = statement.id;
        self.push_statement(statement);
        self.generated.push(GeneratedStatement {
            cycle,
            statement: id,
        });
        true
    }

    /// Run one feedback cycle.
    ///
    /// Only statements present at entry are visited; statements generated
    /// during the cycle wait for the next one.
    pub fn process_feedback_cycle(&mut self) -> CycleMetrics {
        let cycle = self.cycle;
        let snapshot_len = self.statements.len();
        let state_snapshot = self.system_state;

        let mut metrics = CycleMetrics {
            cycle,
            ..Default::default()
        };
        let mut total_feedback = 0.0;
        let mut emitted: Vec<(String, String)> = Vec::new();

        for index in 0..snapshot_len {
            let statement = &mut self.statements[index];
            let score = statement.feedback_score();

            if score.abs() > self.config.feedback_threshold {
                let context = AdaptationContext::new(state_snapshot, cycle);

                for primitive in &mut statement.system_primitives {
                    if let Some(text) = primitive.adapt(score, &context, &mut self.rng) {
                        emitted.push((text, statement.content.clone()));
                    }
                    metrics.adaptations += 1;
                    metrics
                        .primitive_metrics
                        .insert(primitive.name.clone(), *primitive.metrics());
                }
            }

            total_feedback += score;
            metrics.processed_statements += 1;
        }

        for (text, origin) in emitted {
            if self.emit_generated(cycle, text, &origin) {
                metrics.generated_statements += 1;
            }
        }

        if metrics.processed_statements > 0 {
            metrics.average_feedback = total_feedback / metrics.processed_statements as f64;
        }

        let outcome = CycleOutcome {
            processed_statements: metrics.processed_statements,
            adaptations: metrics.adaptations,
            average_feedback: metrics.average_feedback,
            statement_count: self.statements.len(),
        };
        self.system_state
            .apply_cycle(&outcome, &self.config.dynamics());
        self.cycle += 1;

        tracing::info!(
            cycle,
            processed = metrics.processed_statements,
            adaptations = metrics.adaptations,
            generated = metrics.generated_statements,
            average_feedback = metrics.average_feedback,
            stability = self.system_state.stability,
            "Feedback cycle complete"
        );

        metrics
    }

    /// Run one purpose cycle over the constructivity tree.
    ///
    /// Every primitive whose constructivity qualifies contributes its
    /// correlation; a correlation with a manifest purpose adopts it and emits
    /// the purpose's high-priority objectives as new statements.
    pub fn process_purpose_cycle(&mut self) -> PurposeCycleMetrics {
        let snapshot_len = self.statements.len();
        let threshold = self.config.objective_priority_threshold;

        let mut metrics = PurposeCycleMetrics::default();
        let mut correlation_sum = 0.0;
        let mut constructivity_sum = 0.0;
        let mut constructivity_count = 0usize;
        let mut emitted: Vec<(String, String)> = Vec::new();

        for statement in &self.statements[..snapshot_len] {
            for primitive in &statement.system_primitives {
                let Some(constructivity) = primitive.constructivity() else {
                    continue;
                };
                constructivity_sum += constructivity.evaluate();
                constructivity_count += 1;

                let Some(qualification) = constructivity.qualification.as_ref() else {
                    continue;
                };
                if !qualification.qualify(constructivity) {
                    continue;
                }
                let Some(correlation) = qualification.semantic_correlation.as_ref() else {
                    continue;
                };
                correlation_sum += correlation.correlate();

                if let Some(purpose) = correlation.manifest_purpose.as_ref() {
                    self.manifest_purpose = Some(Arc::clone(purpose));
                    emitted.extend(
                        purpose
                            .generate_statements(threshold)
                            .into_iter()
                            .map(|text| (text, statement.content.clone())),
                    );
                }
            }
            metrics.processed_statements += 1;
        }

        for (text, origin) in emitted {
            if self.emit_generated(self.cycle, text, &origin) {
                metrics.generated_statements += 1;
            }
        }

        if metrics.processed_statements > 0 {
            metrics.average_correlation = correlation_sum / metrics.processed_statements as f64;
        }
        if constructivity_count > 0 {
            metrics.average_constructivity = constructivity_sum / constructivity_count as f64;
        }

        tracing::info!(
            processed = metrics.processed_statements,
            generated = metrics.generated_statements,
            average_correlation = metrics.average_correlation,
            "Purpose cycle complete"
        );

        metrics
    }
}
