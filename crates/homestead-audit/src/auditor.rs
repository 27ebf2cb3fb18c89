//! The corpus audit checks.
//!
//! Each check is callable on its own and returns its findings in a
//! deterministic order. [`CorpusAuditor::audit`] runs them all against one
//! dependency graph build.

use std::collections::BTreeMap;
use std::sync::Arc;

use homestead_core::{AuditRules, PrerequisiteToken, RulesConfig, normalize};
use homestead_graph::DependencyGraph;
use homestead_types::{Corpus, Entity, Finding, FindingKind, FindingPayload};

use crate::report::AuditReport;

/// Static analyzer for one corpus version.
#[derive(Debug, Clone)]
pub struct CorpusAuditor {
    corpus: Arc<Corpus>,
    rules: AuditRules,
    stage_plot_thresholds: BTreeMap<String, u32>,
}

impl CorpusAuditor {
    /// Create an auditor with explicit tables.
    pub const fn new(
        corpus: Arc<Corpus>,
        rules: AuditRules,
        stage_plot_thresholds: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            corpus,
            rules,
            stage_plot_thresholds,
        }
    }

    /// Create an auditor from a loaded rules file.
    pub fn from_config(corpus: Arc<Corpus>, config: &RulesConfig) -> Self {
        Self::new(
            corpus,
            config.audit.clone(),
            config.resolver.stage_plot_thresholds.clone(),
        )
    }

    /// The audited corpus.
    pub const fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    /// Run every check and collect the findings.
    pub fn audit(&self) -> AuditReport {
        let graph = DependencyGraph::build(self.corpus.iter());

        let mut findings = cycle_findings(&graph);
        findings.extend(self.find_dangling());
        findings.extend(self.check_stage_gates());
        findings.extend(self.check_tool_gates());
        findings.extend(self.check_material_reachability());
        findings.extend(self.validate_bootstrap_economy());

        let report = AuditReport {
            entity_count: self.corpus.len(),
            graph: graph.stats(),
            findings,
        };
        tracing::info!(
            entities = report.entity_count,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Corpus audit complete"
        );
        report
    }

    /// Every dependency cycle is an error.
    pub fn detect_cycles(&self) -> Vec<Finding> {
        cycle_findings(&DependencyGraph::build(self.corpus.iter()))
    }

    /// A token that is neither a typed gate nor a known entity is an error.
    pub fn find_dangling(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for entity in self.corpus.iter() {
            for raw in &entity.raw_prerequisites {
                let token = PrerequisiteToken::parse(raw, &self.stage_plot_thresholds, &self.corpus);
                if token.is_recognized() {
                    continue;
                }
                tracing::debug!(entity = %entity.id, token = %raw, "Dangling prerequisite");
                findings.push(
                    Finding::new(
                        FindingKind::DanglingPrerequisite,
                        format!(
                            "Prerequisite '{raw}' of '{}' is neither a typed gate nor a known entity",
                            entity.id
                        ),
                    )
                    .for_entity(&entity.id)
                    .with_payload(FindingPayload::Token { token: raw.clone() }),
                );
            }
        }
        findings
    }

    /// Entities tagged with a staged category should carry a farm-stage
    /// gate at least as high as the tag implies.
    pub fn check_stage_gates(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for entity in self.corpus.iter() {
            for tag in &entity.tags {
                let tag = normalize(tag);
                let Some(&required_stage) = self.rules.stage_tags.get(&tag) else {
                    continue;
                };
                if self.highest_stage_gate(entity) >= Some(required_stage) {
                    continue;
                }
                findings.push(
                    Finding::new(
                        FindingKind::MissingStageGate,
                        format!(
                            "'{}' is tagged '{tag}' but does not require farm stage {required_stage}",
                            entity.id
                        ),
                    )
                    .for_entity(&entity.id)
                    .with_payload(FindingPayload::StageGate { tag, required_stage }),
                );
            }
        }
        findings
    }

    /// Actions in the tool-gating table should require their tool, either
    /// as `craft_<tool>` or as a bare reference to the tool entity.
    pub fn check_tool_gates(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (action, tool) in &self.rules.tool_gates {
            let Some(entity) = self.corpus.get(action) else {
                tracing::debug!(action = %action, "Tool-gated action not in corpus");
                continue;
            };
            let crafted = format!("{}{tool}", homestead_core::token::CRAFT_PREFIX);
            let gated = entity.raw_prerequisites.iter().any(|raw| {
                let token = normalize(raw);
                token == *tool || token == crafted
            });
            if gated {
                continue;
            }
            findings.push(
                Finding::new(
                    FindingKind::MissingToolGate,
                    format!("'{action}' should require tool '{tool}'"),
                )
                .for_entity(action)
                .with_payload(FindingPayload::ToolGate { tool: tool.clone() }),
            );
        }
        findings
    }

    /// Every essential material needs at least one producer.
    pub fn check_material_reachability(&self) -> Vec<Finding> {
        self.rules
            .essential_materials
            .iter()
            .filter(|material| {
                !self
                    .corpus
                    .iter()
                    .any(|entity| entity.produces.iter().any(|p| p == *material))
            })
            .map(|material| {
                Finding::new(
                    FindingKind::UnreachableMaterial,
                    format!("No entity produces essential material '{material}'"),
                )
                .with_payload(FindingPayload::Material {
                    material: material.clone(),
                })
            })
            .collect()
    }

    /// The bootstrap entity's first tier must be affordable with the
    /// starting gold.
    pub fn validate_bootstrap_economy(&self) -> Vec<Finding> {
        let id = &self.rules.bootstrap_entity;
        let Some(entity) = self.corpus.get(id) else {
            return vec![
                Finding::new(
                    FindingKind::BootstrapEntityMissing,
                    format!("Bootstrap entity '{id}' is not in the corpus"),
                )
                .for_entity(id),
            ];
        };

        let required = entity.tiers.first().map_or(0, |tier| tier.gold);
        let available = self.rules.starting_gold;
        if required <= available {
            return Vec::new();
        }
        let shortfall = required.saturating_sub(available);
        vec![
            Finding::new(
                FindingKind::BootstrapInfeasible,
                format!(
                    "Bootstrap entity '{id}' costs {required} gold but players start with \
                     {available} (short by {shortfall})"
                ),
            )
            .for_entity(id)
            .with_payload(FindingPayload::CostDelta {
                required,
                available,
                shortfall,
            }),
        ]
    }

    /// Highest `farm_stage_<N>` gate among an entity's tokens.
    fn highest_stage_gate(&self, entity: &Entity) -> Option<u32> {
        entity
            .raw_prerequisites
            .iter()
            .filter_map(|raw| {
                match PrerequisiteToken::parse(raw, &self.stage_plot_thresholds, &self.corpus) {
                    PrerequisiteToken::FarmStage(stage) => Some(stage),
                    _ => None,
                }
            })
            .max()
    }
}

fn cycle_findings(graph: &DependencyGraph) -> Vec<Finding> {
    graph
        .detect_circular_dependencies()
        .into_iter()
        .map(|cycle| {
            let mut rendered = cycle.path.join(" -> ");
            if let Some(first) = cycle.path.first() {
                rendered.push_str(" -> ");
                rendered.push_str(first);
            }
            let finding = Finding::new(
                FindingKind::CircularDependency,
                format!("Circular dependency: {rendered}"),
            );
            let finding = match cycle.path.first() {
                Some(first) => finding.for_entity(first),
                None => finding,
            };
            finding.with_payload(FindingPayload::CyclePath { path: cycle.path })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
