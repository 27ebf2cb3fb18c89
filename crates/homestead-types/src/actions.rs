//! Action requests and their validation results.
//!
//! An [`ActionRequest`] is what the game UI asks the façade about before
//! letting the player act. The answer is an [`ActionValidationResult`] in
//! which every error carries an explicit [`IssueCategory`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::ResourceCost;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The kind of action a player attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Buy a catalog entity from a shop.
    Purchase,
    /// Construct a building.
    Build,
    /// Clear an obstacle.
    Cleanup,
    /// Craft an item from a recipe.
    Craft,
    /// Apply an upgrade to an owned tool, weapon or building.
    Upgrade,
    /// Plant seeds of a crop on a free plot.
    Plant,
    /// Water growing crops.
    Water,
    /// Collect a finished crop.
    Harvest,
    /// Send the hero on an adventure.
    StartAdventure,
    /// Rest to recover energy.
    Rest,
}

impl ActionKind {
    /// Whether the action's target is a catalog entity whose prerequisites
    /// must be resolved.
    pub const fn targets_entity(self) -> bool {
        matches!(
            self,
            Self::Purchase | Self::Build | Self::Cleanup | Self::Craft | Self::Upgrade
        )
    }
}

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

/// A single action attempt to validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionRequest {
    /// What the player is trying to do.
    pub kind: ActionKind,
    /// Entity id for entity-targeting actions, crop id for planting.
    #[serde(default)]
    pub target: Option<String>,
    /// Resources the action consumes.
    #[serde(default)]
    pub cost: ResourceCost,
    /// Location or screen the action must be performed from, if any.
    #[serde(default)]
    pub location: Option<String>,
}

impl ActionRequest {
    /// Create a request with no target, cost or location requirement.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target: None,
            cost: ResourceCost::default(),
            location: None,
        }
    }

    /// Set the action target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the resource cost.
    #[must_use]
    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    /// Require the action to be performed from a location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Which bucket a validation error belongs to.
///
/// Attached where each error is raised, so callers never classify by
/// inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Not enough of some resource.
    Resource,
    /// Wrong location or screen.
    Location,
    /// An unmet prerequisite token.
    Prerequisite,
    /// An action-kind-specific rule.
    Rule,
}

/// A resource the player may be short of.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum ResourceKind {
    /// Hero energy.
    Energy,
    /// Gold.
    Gold,
    /// Water.
    Water,
    /// A named material.
    Material(String),
    /// Seeds for a named crop.
    Seed(String),
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Energy => f.write_str("energy"),
            Self::Gold => f.write_str("gold"),
            Self::Water => f.write_str("water"),
            Self::Material(id) => write!(f, "material '{id}'"),
            Self::Seed(crop) => write!(f, "{crop} seeds"),
        }
    }
}

/// A categorized resource shortfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceIssue {
    /// The resource that is short.
    pub resource: ResourceKind,
    /// Quantity the action needs.
    pub required: u32,
    /// Quantity the player has.
    pub available: u32,
}

/// One blocking validation error with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ValidationIssue {
    /// Error bucket.
    pub category: IssueCategory,
    /// Human-readable message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// ActionValidationResult
// ---------------------------------------------------------------------------

/// Structured answer to "can the player perform this action right now?".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionValidationResult {
    /// True iff `errors` is empty.
    pub can_perform: bool,
    /// Every blocking error message, in the order raised.
    pub errors: Vec<String>,
    /// Non-blocking advisories.
    pub warnings: Vec<String>,
    /// Raw prerequisite tokens that are unmet.
    pub missing_prerequisites: Vec<String>,
    /// Resource shortfalls.
    pub resource_issues: Vec<ResourceIssue>,
    /// Location/screen mismatches.
    pub location_issues: Vec<String>,
    /// Every error tagged with its category, parallel to `errors`.
    pub issues: Vec<ValidationIssue>,
}

impl ActionValidationResult {
    /// Record a blocking error under a category.
    pub fn push_error(&mut self, category: IssueCategory, message: impl Into<String>) {
        let message = message.into();
        if category == IssueCategory::Location {
            self.location_issues.push(message.clone());
        }
        self.errors.push(message.clone());
        self.issues.push(ValidationIssue { category, message });
    }

    /// Record a non-blocking warning.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Errors raised under the given category.
    pub fn errors_in(&self, category: IssueCategory) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(move |issue| issue.category == category)
            .map(|issue| issue.message.as_str())
    }

    /// Set `can_perform` from the error list and return the finished result.
    #[must_use]
    pub fn finish(mut self) -> Self {
        self.can_perform = self.errors.is_empty();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_targeting_kinds() {
        assert!(ActionKind::Purchase.targets_entity());
        assert!(ActionKind::Cleanup.targets_entity());
        assert!(!ActionKind::Plant.targets_entity());
        assert!(!ActionKind::StartAdventure.targets_entity());
    }

    #[test]
    fn every_error_lands_in_exactly_one_category() {
        let mut result = ActionValidationResult::default();
        result.push_error(IssueCategory::Resource, "Not enough gold: need 10, have 3");
        result.push_error(IssueCategory::Location, "Must be at the shop");
        result.push_warning("Energy will be nearly depleted");
        let result = result.finish();

        assert!(!result.can_perform);
        assert_eq!(result.errors.len(), result.issues.len());
        assert_eq!(result.location_issues, ["Must be at the shop"]);
        assert_eq!(result.errors_in(IssueCategory::Resource).count(), 1);
        assert_eq!(result.errors_in(IssueCategory::Rule).count(), 0);
    }

    #[test]
    fn warnings_never_block() {
        let mut result = ActionValidationResult::default();
        result.push_warning("careful");
        assert!(result.finish().can_perform);
    }

    #[test]
    fn resource_kind_display() {
        assert_eq!(ResourceKind::Gold.to_string(), "gold");
        assert_eq!(ResourceKind::Seed("carrot".into()).to_string(), "carrot seeds");
    }
}
