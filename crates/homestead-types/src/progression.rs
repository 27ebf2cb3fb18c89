//! Read-only view of a player's progression state.
//!
//! The snapshot is owned by the game simulation. The engine borrows it for
//! the duration of a single call and never mutates it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Resource quantities currently held by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Gold on hand.
    #[serde(default)]
    pub gold: u32,
    /// Hero energy remaining today.
    #[serde(default)]
    pub energy: u32,
    /// Water in the well/can.
    #[serde(default)]
    pub water: u32,
    /// Per-material counts.
    #[serde(default)]
    pub materials: BTreeMap<String, u32>,
    /// Per-crop seed counts.
    #[serde(default)]
    pub seeds: BTreeMap<String, u32>,
}

impl Resources {
    /// Quantity of a material, zero if absent.
    pub fn material(&self, material: &str) -> u32 {
        self.materials.get(material).copied().unwrap_or(0)
    }

    /// Quantity of seeds for a crop, zero if absent.
    pub fn seeds_for(&self, crop: &str) -> u32 {
        self.seeds.get(crop).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Processes
// ---------------------------------------------------------------------------

/// The kind of a long-running process owned by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// A crop growing on a plot.
    Crop,
    /// An adventure the hero is away on.
    Adventure,
    /// An item being crafted.
    Crafting,
}

/// A single in-flight process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProcessInstance {
    /// What the process is.
    pub kind: ProcessKind,
    /// The entity or crop the process belongs to.
    pub target: String,
    /// Whether the process has finished and is waiting to be collected.
    #[serde(default)]
    pub ready: bool,
}

// ---------------------------------------------------------------------------
// ProgressionSnapshot
// ---------------------------------------------------------------------------

/// Read-only progression state evaluated by the resolver and the façade.
///
/// The scalar counters and membership sets are what prerequisite tokens are
/// resolved against, and are the only fields folded into the cache
/// fingerprint. Resources, processes and location are consulted only by the
/// action validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProgressionSnapshot {
    /// Hero level.
    #[serde(default)]
    pub hero_level: u32,
    /// Current farm stage number.
    #[serde(default)]
    pub farm_stage: u32,
    /// Total number of farm plots.
    #[serde(default)]
    pub farm_plots: u32,
    /// Plots currently occupied by crops.
    #[serde(default)]
    pub planted_plots: u32,
    /// Unlocked upgrade/blueprint/deed ids.
    #[serde(default)]
    pub unlocked_upgrades: BTreeSet<String>,
    /// Completed cleanup ids.
    #[serde(default)]
    pub completed_cleanups: BTreeSet<String>,
    /// Owned tool ids.
    #[serde(default)]
    pub owned_tools: BTreeSet<String>,
    /// Owned weapons and their upgrade level (0 = blueprint only).
    #[serde(default)]
    pub owned_weapons: BTreeMap<String, u32>,
    /// Resource quantities.
    #[serde(default)]
    pub resources: Resources,
    /// In-flight processes.
    #[serde(default)]
    pub processes: Vec<ProcessInstance>,
    /// Screen or location the player is currently on.
    #[serde(default)]
    pub current_location: Option<String>,
}

impl ProgressionSnapshot {
    /// Whether an upgrade id has been unlocked.
    pub fn has_upgrade(&self, id: &str) -> bool {
        self.unlocked_upgrades.contains(id)
    }

    /// Whether a cleanup id has been completed.
    pub fn has_cleanup(&self, id: &str) -> bool {
        self.completed_cleanups.contains(id)
    }

    /// Whether a tool is owned.
    pub fn owns_tool(&self, id: &str) -> bool {
        self.owned_tools.contains(id)
    }

    /// Upgrade level of an owned weapon, if owned.
    pub fn weapon_level(&self, id: &str) -> Option<u32> {
        self.owned_weapons.get(id).copied()
    }

    /// Plots not currently occupied by crops.
    pub const fn free_plots(&self) -> u32 {
        self.farm_plots.saturating_sub(self.planted_plots)
    }

    /// Number of processes of the given kind.
    pub fn process_count(&self, kind: ProcessKind) -> usize {
        self.processes.iter().filter(|p| p.kind == kind).count()
    }

    /// Whether any process of the given kind is ready to collect.
    pub fn has_ready_process(&self, kind: ProcessKind) -> bool {
        self.processes.iter().any(|p| p.kind == kind && p.ready)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plots_never_underflows() {
        let snapshot = ProgressionSnapshot {
            farm_plots: 2,
            planted_plots: 5,
            ..ProgressionSnapshot::default()
        };
        assert_eq!(snapshot.free_plots(), 0);
    }

    #[test]
    fn process_queries() {
        let snapshot = ProgressionSnapshot {
            processes: vec![
                ProcessInstance { kind: ProcessKind::Crop, target: "carrot".into(), ready: false },
                ProcessInstance { kind: ProcessKind::Crop, target: "potato".into(), ready: true },
                ProcessInstance { kind: ProcessKind::Crafting, target: "hoe".into(), ready: false },
            ],
            ..ProgressionSnapshot::default()
        };
        assert_eq!(snapshot.process_count(ProcessKind::Crop), 2);
        assert!(snapshot.has_ready_process(ProcessKind::Crop));
        assert!(!snapshot.has_ready_process(ProcessKind::Crafting));
        assert_eq!(snapshot.process_count(ProcessKind::Adventure), 0);
    }

    #[test]
    fn missing_resources_read_as_zero() {
        let resources = Resources::default();
        assert_eq!(resources.material("wood"), 0);
        assert_eq!(resources.seeds_for("carrot"), 0);
    }
}
