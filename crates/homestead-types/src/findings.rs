//! Structured findings produced by the corpus auditor.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Non-blocking consistency issue.
    Warning,
    /// Structural defect that must be fixed before the data ships.
    Error,
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Entities that transitively require themselves.
    CircularDependency,
    /// A token that is neither a typed gate nor a known entity id.
    DanglingPrerequisite,
    /// An entity whose tags imply a farm stage its tokens do not require.
    MissingStageGate,
    /// An action that should require a tool but does not.
    MissingToolGate,
    /// An essential material that nothing in the corpus produces.
    UnreachableMaterial,
    /// The first bootstrap tier costs more than the starting gold.
    BootstrapInfeasible,
    /// The configured bootstrap entity does not exist.
    BootstrapEntityMissing,
}

impl FindingKind {
    /// The severity every finding of this kind carries.
    pub const fn severity(self) -> Severity {
        match self {
            Self::CircularDependency
            | Self::DanglingPrerequisite
            | Self::BootstrapInfeasible
            | Self::BootstrapEntityMissing => Severity::Error,
            Self::MissingStageGate | Self::MissingToolGate | Self::UnreachableMaterial => {
                Severity::Warning
            }
        }
    }
}

/// Optional structured detail attached to a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FindingPayload {
    /// The cycle, in dependency order.
    CyclePath {
        /// Entity ids forming the cycle.
        path: Vec<String>,
    },
    /// The offending raw token.
    Token {
        /// The token as authored.
        token: String,
    },
    /// The stage gate the entity should carry.
    StageGate {
        /// Tag that implies the gate.
        tag: String,
        /// Minimum farm stage implied by the tag.
        required_stage: u32,
    },
    /// The tool the action should require.
    ToolGate {
        /// Tool id.
        tool: String,
    },
    /// An unproduced material.
    Material {
        /// Material id.
        material: String,
    },
    /// A gold shortfall.
    CostDelta {
        /// Gold the first tier costs.
        required: u32,
        /// Gold the player starts with.
        available: u32,
        /// `required - available`.
        shortfall: u32,
    },
}

/// A single corpus audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Finding {
    /// What was found.
    pub kind: FindingKind,
    /// Error or warning, derived from `kind`.
    pub severity: Severity,
    /// Human-readable diagnostic.
    pub message: String,
    /// The offending entity, when the finding is about one.
    pub entity_id: Option<String>,
    /// Structured detail.
    pub payload: Option<FindingPayload>,
}

impl Finding {
    /// Create a finding with the severity implied by its kind.
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            entity_id: None,
            payload: None,
        }
    }

    /// Attach the offending entity id.
    #[must_use]
    pub fn for_entity(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: FindingPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Whether this finding blocks shipping.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_kind() {
        assert!(Finding::new(FindingKind::CircularDependency, "x").is_error());
        assert!(Finding::new(FindingKind::BootstrapInfeasible, "x").is_error());
        assert!(!Finding::new(FindingKind::MissingToolGate, "x").is_error());
        assert!(!Finding::new(FindingKind::UnreachableMaterial, "x").is_error());
    }

    #[test]
    fn payload_serializes_with_type_tag() {
        let finding = Finding::new(FindingKind::BootstrapInfeasible, "too expensive")
            .for_entity("blueprint_rusty_sword")
            .with_payload(FindingPayload::CostDelta {
                required: 75,
                available: 50,
                shortfall: 25,
            });
        let json = serde_json::to_value(&finding).unwrap_or_default();
        assert_eq!(json["payload"]["type"], "cost_delta");
        assert_eq!(json["payload"]["shortfall"], 25);
        assert_eq!(json["severity"], "error");
    }
}
