//! Action validation pipeline.
//!
//! The pipeline runs its stages in order and never stops early, so the
//! player sees every problem at once:
//! 1. Resources -- energy, gold, water, materials and seeds
//! 2. Prerequisites -- only for actions that target a catalog entity
//! 3. Location -- is the player on the right screen?
//! 4. Action rules -- planting, harvesting, adventures, crafting capacity
//! 5. Warnings -- advisories that never block
//!
//! Every error is tagged with its [`IssueCategory`] where it is raised.

use std::sync::Arc;

use homestead_core::{ActionRules, PrerequisiteResolver};
use homestead_types::{
    ActionKind, ActionRequest, ActionValidationResult, IssueCategory, ProcessKind,
    ProgressionSnapshot, ResourceCost, ResourceIssue, ResourceKind,
};

/// Validates action attempts against a progression snapshot.
#[derive(Debug, Clone)]
pub struct ActionValidator {
    resolver: Arc<PrerequisiteResolver>,
    rules: ActionRules,
}

impl ActionValidator {
    /// Create a validator that resolves prerequisites through `resolver`.
    pub const fn new(resolver: Arc<PrerequisiteResolver>, rules: ActionRules) -> Self {
        Self { resolver, rules }
    }

    /// The resolver used for prerequisite checks.
    pub const fn resolver(&self) -> &Arc<PrerequisiteResolver> {
        &self.resolver
    }

    /// Validate an action through the full pipeline.
    ///
    /// `can_perform` is true iff no stage raised an error.
    pub fn can_perform(
        &self,
        action: &ActionRequest,
        snapshot: &ProgressionSnapshot,
    ) -> ActionValidationResult {
        let mut result = ActionValidationResult::default();

        // Stage 1: Resources
        validate_resources(&action.cost, snapshot, &mut result);

        // Stage 2: Prerequisites
        if action.kind.targets_entity() {
            self.validate_prerequisites(action, snapshot, &mut result);
        }

        // Stage 3: Location
        validate_location(action, snapshot, &mut result);

        // Stage 4: Action rules
        self.validate_action_rules(action, snapshot, &mut result);

        // Stage 5: Warnings
        self.collect_warnings(action, snapshot, &mut result);

        let result = result.finish();
        if !result.can_perform {
            tracing::debug!(
                action = ?action.kind,
                target = action.target.as_deref().unwrap_or(""),
                errors = result.errors.len(),
                "Action rejected"
            );
        }
        result
    }

    /// Stage 2: resolve the target entity's prerequisites.
    fn validate_prerequisites(
        &self,
        action: &ActionRequest,
        snapshot: &ProgressionSnapshot,
        result: &mut ActionValidationResult,
    ) {
        let Some(target) = action.target.as_deref() else {
            result.push_error(
                IssueCategory::Rule,
                format!("{:?} requires a target entity", action.kind),
            );
            return;
        };

        let prerequisites = self.resolver.check(target, snapshot);
        if prerequisites.satisfied {
            return;
        }
        for reason in prerequisites.reasons {
            result.push_error(IssueCategory::Prerequisite, reason);
        }
        result
            .missing_prerequisites
            .extend(prerequisites.missing_tokens);
    }

    /// Stage 4: rules specific to the kind of action.
    fn validate_action_rules(
        &self,
        action: &ActionRequest,
        snapshot: &ProgressionSnapshot,
        result: &mut ActionValidationResult,
    ) {
        match action.kind {
            ActionKind::Plant => validate_planting(action, snapshot, result),
            ActionKind::Water => {
                if snapshot.planted_plots == 0 && snapshot.process_count(ProcessKind::Crop) == 0 {
                    result.push_error(IssueCategory::Rule, "No crops to water");
                }
            }
            ActionKind::Harvest => {
                if !snapshot.has_ready_process(ProcessKind::Crop) {
                    result.push_error(IssueCategory::Rule, "Nothing is ready to harvest");
                }
            }
            ActionKind::StartAdventure => {
                if snapshot.process_count(ProcessKind::Adventure) > 0 {
                    result.push_error(IssueCategory::Rule, "An adventure is already in progress");
                }
            }
            ActionKind::Craft => {
                let active = snapshot.process_count(ProcessKind::Crafting);
                let capacity = usize::try_from(self.rules.crafting_capacity).unwrap_or(usize::MAX);
                if active >= capacity {
                    result.push_error(
                        IssueCategory::Rule,
                        format!("Crafting queue is full ({active}/{capacity})"),
                    );
                }
            }
            ActionKind::Purchase
            | ActionKind::Build
            | ActionKind::Cleanup
            | ActionKind::Upgrade
            | ActionKind::Rest => {}
        }
    }

    /// Stage 5: non-blocking advisories.
    fn collect_warnings(
        &self,
        action: &ActionRequest,
        snapshot: &ProgressionSnapshot,
        result: &mut ActionValidationResult,
    ) {
        let energy = snapshot.resources.energy;
        if action.cost.energy > 0 && energy >= action.cost.energy {
            let remaining = energy.saturating_sub(action.cost.energy);
            if remaining < self.rules.low_energy_warning {
                result.push_warning(format!("Energy will drop to {remaining}"));
            }
        }

        let Some(target) = action.target.as_deref() else {
            return;
        };
        match action.kind {
            ActionKind::Purchase | ActionKind::Build | ActionKind::Upgrade
                if snapshot.has_upgrade(target) =>
            {
                result.push_warning(format!("'{target}' is already unlocked"));
            }
            ActionKind::Cleanup if snapshot.has_cleanup(target) => {
                result.push_warning(format!("'{target}' is already cleared"));
            }
            _ => {}
        }
    }
}

/// Stage 1: compare each cost component with what the player holds.
fn validate_resources(
    cost: &ResourceCost,
    snapshot: &ProgressionSnapshot,
    result: &mut ActionValidationResult,
) {
    if cost.is_free() {
        return;
    }
    let held = &snapshot.resources;
    require(result, ResourceKind::Energy, cost.energy, held.energy);
    require(result, ResourceKind::Gold, cost.gold, held.gold);
    require(result, ResourceKind::Water, cost.water, held.water);
    for (material, &needed) in &cost.materials {
        require(
            result,
            ResourceKind::Material(material.clone()),
            needed,
            held.material(material),
        );
    }
    for (crop, &needed) in &cost.seeds {
        require(result, ResourceKind::Seed(crop.clone()), needed, held.seeds_for(crop));
    }
}

/// Record a resource shortfall if `available < required`.
fn require(
    result: &mut ActionValidationResult,
    resource: ResourceKind,
    required: u32,
    available: u32,
) {
    if available >= required {
        return;
    }
    result.push_error(
        IssueCategory::Resource,
        format!("Not enough {resource}: need {required}, have {available}"),
    );
    result.resource_issues.push(ResourceIssue {
        resource,
        required,
        available,
    });
}

/// Stage 3: the action's required location must match the player's.
fn validate_location(
    action: &ActionRequest,
    snapshot: &ProgressionSnapshot,
    result: &mut ActionValidationResult,
) {
    let Some(required) = action.location.as_deref() else {
        return;
    };
    match snapshot.current_location.as_deref() {
        Some(current) if current == required => {}
        Some(current) => result.push_error(
            IssueCategory::Location,
            format!("Must be at {required} (currently at {current})"),
        ),
        None => result.push_error(IssueCategory::Location, format!("Must be at {required}")),
    }
}

/// Planting needs seeds for the crop and a free plot.
fn validate_planting(
    action: &ActionRequest,
    snapshot: &ProgressionSnapshot,
    result: &mut ActionValidationResult,
) {
    match action.target.as_deref() {
        None => result.push_error(IssueCategory::Rule, "Planting requires a crop"),
        Some(crop) => {
            let seed = ResourceKind::Seed(String::from(crop));
            let already_flagged = result.resource_issues.iter().any(|i| i.resource == seed);
            if !already_flagged {
                require(result, seed, 1, snapshot.resources.seeds_for(crop));
            }
        }
    }
    if snapshot.free_plots() == 0 {
        result.push_error(IssueCategory::Rule, "No free farm plots");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use homestead_core::ResolverRules;
    use homestead_types::{Corpus, Entity, ProcessInstance};

    use super::*;

    fn validator() -> ActionValidator {
        let corpus = Corpus::from_entities([
            Entity::new("hoe", Vec::<String>::new()),
            Entity::new("till_soil", ["hoe"]),
            Entity::new("clear_rocks", ["farm_stage_2"]),
            Entity::new("iron_sword", ["blueprint_iron_sword", "hero_level_5"]),
        ]);
        let resolver = PrerequisiteResolver::new(Arc::new(corpus), ResolverRules::default());
        ActionValidator::new(Arc::new(resolver), ActionRules::default())
    }

    fn snapshot() -> ProgressionSnapshot {
        let mut s = ProgressionSnapshot {
            farm_stage: 1,
            hero_level: 1,
            farm_plots: 4,
            ..ProgressionSnapshot::default()
        };
        s.resources.energy = 20;
        s.resources.gold = 100;
        s.resources.water = 3;
        s
    }

    fn process(kind: ProcessKind, ready: bool) -> ProcessInstance {
        ProcessInstance {
            kind,
            target: "x".into(),
            ready,
        }
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    #[test]
    fn each_shortfall_is_an_error_and_a_resource_issue() {
        let mut cost = ResourceCost::gold(150);
        cost.energy = 25;
        cost.materials.insert("wood".into(), 2);
        let action = ActionRequest::new(ActionKind::Purchase)
            .with_target("hoe")
            .with_cost(cost);

        let result = validator().can_perform(&action, &snapshot());
        assert!(!result.can_perform);
        assert_eq!(result.resource_issues.len(), 3);
        assert_eq!(result.errors_in(IssueCategory::Resource).count(), 3);
        assert!(result.errors.contains(&"Not enough gold: need 150, have 100".to_owned()));
        assert!(result.resource_issues.iter().any(|i| i.resource
            == ResourceKind::Material("wood".into())
            && i.required == 2
            && i.available == 0));
    }

    #[test]
    fn free_action_needs_no_resources() {
        let action = ActionRequest::new(ActionKind::Rest);
        let result = validator().can_perform(&action, &ProgressionSnapshot::default());
        assert!(result.can_perform);
        assert!(result.resource_issues.is_empty());
    }

    #[test]
    fn affordable_root_purchase_is_allowed() {
        let action = ActionRequest::new(ActionKind::Purchase)
            .with_target("hoe")
            .with_cost(ResourceCost::gold(30));
        let result = validator().can_perform(&action, &snapshot());
        assert!(result.can_perform);
        assert!(result.errors.is_empty());
    }

    // -----------------------------------------------------------------------
    // Prerequisites
    // -----------------------------------------------------------------------

    #[test]
    fn unmet_prerequisites_are_reported_with_tokens() {
        let action = ActionRequest::new(ActionKind::Purchase).with_target("iron_sword");
        let result = validator().can_perform(&action, &snapshot());
        assert!(!result.can_perform);
        assert_eq!(
            result.missing_prerequisites,
            ["blueprint_iron_sword", "hero_level_5"]
        );
        assert_eq!(result.errors_in(IssueCategory::Prerequisite).count(), 2);
    }

    #[test]
    fn non_entity_actions_skip_prerequisites() {
        let mut s = snapshot();
        s.processes.push(process(ProcessKind::Crop, true));
        // The target names an entity with unmet prerequisites, but harvesting
        // does not resolve catalog entities.
        let action = ActionRequest::new(ActionKind::Harvest).with_target("till_soil");
        let result = validator().can_perform(&action, &s);
        assert!(result.can_perform);
        assert!(result.missing_prerequisites.is_empty());
    }

    #[test]
    fn entity_action_without_target_is_rejected() {
        let result = validator().can_perform(&ActionRequest::new(ActionKind::Build), &snapshot());
        assert_eq!(result.errors_in(IssueCategory::Rule).count(), 1);
    }

    #[test]
    fn unknown_target_fails_closed() {
        let action = ActionRequest::new(ActionKind::Cleanup).with_target("moon_rocks");
        let result = validator().can_perform(&action, &snapshot());
        assert!(!result.can_perform);
        assert_eq!(result.missing_prerequisites, ["moon_rocks"]);
    }

    // -----------------------------------------------------------------------
    // Location
    // -----------------------------------------------------------------------

    #[test]
    fn wrong_location_is_a_location_issue() {
        let mut s = snapshot();
        s.current_location = Some("farm".into());
        let action = ActionRequest::new(ActionKind::Purchase)
            .with_target("hoe")
            .at("shop");
        let result = validator().can_perform(&action, &s);
        assert_eq!(result.location_issues, ["Must be at shop (currently at farm)"]);
        assert!(!result.can_perform);

        s.current_location = Some("shop".into());
        assert!(validator().can_perform(&action, &s).can_perform);
    }

    // -----------------------------------------------------------------------
    // Action rules
    // -----------------------------------------------------------------------

    #[test]
    fn planting_needs_seeds_and_a_free_plot() {
        let mut s = snapshot();
        s.planted_plots = 4;
        let action = ActionRequest::new(ActionKind::Plant).with_target("carrot");
        let result = validator().can_perform(&action, &s);
        assert!(result.errors.contains(&"Not enough carrot seeds: need 1, have 0".to_owned()));
        assert!(result.errors.contains(&"No free farm plots".to_owned()));

        s.planted_plots = 3;
        s.resources.seeds.insert("carrot".into(), 2);
        assert!(validator().can_perform(&action, &s).can_perform);
    }

    #[test]
    fn planting_seed_shortfall_is_not_double_counted() {
        let mut cost = ResourceCost::default();
        cost.seeds.insert("carrot".into(), 1);
        let action = ActionRequest::new(ActionKind::Plant)
            .with_target("carrot")
            .with_cost(cost);
        let result = validator().can_perform(&action, &snapshot());
        assert_eq!(result.resource_issues.len(), 1);
    }

    #[test]
    fn harvest_needs_a_ready_crop() {
        let mut s = snapshot();
        s.processes.push(process(ProcessKind::Crop, false));
        let action = ActionRequest::new(ActionKind::Harvest);
        assert!(!validator().can_perform(&action, &s).can_perform);
        s.processes.push(process(ProcessKind::Crop, true));
        assert!(validator().can_perform(&action, &s).can_perform);
    }

    #[test]
    fn only_one_adventure_at_a_time() {
        let mut s = snapshot();
        let action = ActionRequest::new(ActionKind::StartAdventure);
        assert!(validator().can_perform(&action, &s).can_perform);
        s.processes.push(process(ProcessKind::Adventure, false));
        let result = validator().can_perform(&action, &s);
        assert_eq!(result.errors, ["An adventure is already in progress"]);
    }

    #[test]
    fn crafting_capacity_is_enforced() {
        let mut s = snapshot();
        s.unlocked_upgrades.insert("hoe".into());
        for _ in 0..3 {
            s.processes.push(process(ProcessKind::Crafting, false));
        }
        let action = ActionRequest::new(ActionKind::Craft).with_target("till_soil");
        let result = validator().can_perform(&action, &s);
        assert_eq!(result.errors, ["Crafting queue is full (3/3)"]);
    }

    #[test]
    fn watering_needs_planted_crops() {
        let mut s = snapshot();
        let action = ActionRequest::new(ActionKind::Water);
        assert!(!validator().can_perform(&action, &s).can_perform);
        s.planted_plots = 1;
        assert!(validator().can_perform(&action, &s).can_perform);
    }

    // -----------------------------------------------------------------------
    // Warnings
    // -----------------------------------------------------------------------

    #[test]
    fn warnings_do_not_block() {
        let mut s = snapshot();
        s.unlocked_upgrades.insert("hoe".into());
        let mut cost = ResourceCost::default();
        cost.energy = 18;
        let action = ActionRequest::new(ActionKind::Purchase)
            .with_target("hoe")
            .with_cost(cost);
        let result = validator().can_perform(&action, &s);
        assert!(result.can_perform);
        assert_eq!(
            result.warnings,
            ["Energy will drop to 2", "'hoe' is already unlocked"]
        );
    }

    #[test]
    fn result_serializes_for_the_ui() {
        let action = ActionRequest::new(ActionKind::Purchase).with_target("till_soil");
        let result = validator().can_perform(&action, &snapshot());
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json["can_perform"], false);
        assert_eq!(json["missing_prerequisites"][0], "hoe");
    }
}
