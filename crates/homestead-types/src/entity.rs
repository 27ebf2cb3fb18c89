//! Catalog entities and the corpus that holds them.
//!
//! An [`Entity`] is an immutable record loaded once per corpus version. The
//! engine never mutates entities; a new corpus version replaces the old one
//! wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// What sort of catalog record an entity is.
///
/// Only used for reporting and by the corpus auditor; prerequisite
/// resolution does not depend on it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A repeatable player action (till soil, water crops, ...).
    #[default]
    Action,
    /// A purchasable or craftable item.
    Item,
    /// A building placed on the farm.
    Building,
    /// A blueprint that unlocks a crafting recipe.
    Blueprint,
    /// A one-off cleanup of an obstacle (rocks, stumps, weeds).
    Cleanup,
    /// A tool the hero can own.
    Tool,
    /// A weapon with upgrade levels.
    Weapon,
}

// ---------------------------------------------------------------------------
// ResourceCost
// ---------------------------------------------------------------------------

/// A bundle of resources consumed by an action or by one tier of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceCost {
    /// Energy spent.
    #[serde(default)]
    pub energy: u32,
    /// Gold spent.
    #[serde(default)]
    pub gold: u32,
    /// Water spent.
    #[serde(default)]
    pub water: u32,
    /// Materials consumed (material id -> quantity).
    #[serde(default)]
    pub materials: BTreeMap<String, u32>,
    /// Seeds consumed (crop id -> quantity).
    #[serde(default)]
    pub seeds: BTreeMap<String, u32>,
}

impl ResourceCost {
    /// A cost consisting only of gold.
    pub fn gold(amount: u32) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }

    /// Whether this cost consumes nothing at all.
    pub fn is_free(&self) -> bool {
        self.energy == 0
            && self.gold == 0
            && self.water == 0
            && self.materials.values().all(|q| *q == 0)
            && self.seeds.values().all(|q| *q == 0)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An immutable corpus record: an id plus its raw prerequisite tokens.
///
/// An empty token list means the entity has no prerequisites. The remaining
/// fields are optional metadata consumed by the corpus auditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Entity {
    /// Unique catalog identifier.
    pub id: String,
    /// Ordered raw prerequisite tokens, exactly as authored.
    #[serde(default, alias = "rawPrerequisites", alias = "prerequisites")]
    pub raw_prerequisites: Vec<String>,
    /// Catalog record kind.
    #[serde(default)]
    pub kind: EntityKind,
    /// Free-form category tags (used for stage-gate consistency checks).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Materials this entity yields when performed or built.
    #[serde(default)]
    pub produces: Vec<String>,
    /// Cost of each upgrade tier, first tier first.
    #[serde(default)]
    pub tiers: Vec<ResourceCost>,
}

impl Entity {
    /// Create an entity with the given prerequisite tokens and no metadata.
    pub fn new<I, S>(id: impl Into<String>, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            raw_prerequisites: prerequisites.into_iter().map(Into::into).collect(),
            kind: EntityKind::default(),
            tags: Vec::new(),
            produces: Vec::new(),
            tiers: Vec::new(),
        }
    }

    /// Set the entity kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add category tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add produced materials.
    #[must_use]
    pub fn with_produces<I, S>(mut self, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(materials.into_iter().map(Into::into));
        self
    }

    /// Append an upgrade tier cost.
    #[must_use]
    pub fn with_tier(mut self, cost: ResourceCost) -> Self {
        self.tiers.push(cost);
        self
    }

    /// Whether the entity has no prerequisite tokens.
    pub fn is_root(&self) -> bool {
        self.raw_prerequisites.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// The flat, id-indexed entity catalog for one corpus version.
///
/// Upstream ingestion is expected to deduplicate ids. If a duplicate slips
/// through, the first occurrence wins and the id is recorded in
/// [`Corpus::duplicate_ids`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    /// Entities in authoring order, duplicates removed.
    entities: Vec<Entity>,
    /// Maps entity id to its position in `entities`.
    index: BTreeMap<String, usize>,
    /// Ids that appeared more than once in the input.
    duplicates: Vec<String>,
}

impl Corpus {
    /// Build a corpus from a sequence of entities.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut corpus = Self::default();
        for entity in entities {
            if corpus.index.contains_key(&entity.id) {
                tracing::warn!(id = %entity.id, "Duplicate entity id dropped from corpus");
                corpus.duplicates.push(entity.id);
                continue;
            }
            corpus.index.insert(entity.id.clone(), corpus.entities.len());
            corpus.entities.push(entity);
        }
        corpus
    }

    /// Parse a corpus from a JSON array of entities.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entities: Vec<Entity> = serde_json::from_str(json)?;
        Ok(Self::from_entities(entities))
    }

    /// Look up an entity by id.
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).and_then(|&pos| self.entities.get(pos))
    }

    /// Whether an entity with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate entities in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids that were dropped because an earlier entity already used them.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicates
    }
}

impl FromIterator<Entity> for Corpus {
    fn from_iter<T: IntoIterator<Item = Entity>>(iter: T) -> Self {
        Self::from_entities(iter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins_on_duplicate_id() {
        let corpus = Corpus::from_entities([
            Entity::new("hoe", Vec::<String>::new()),
            Entity::new("hoe", ["farm_stage_2"]),
            Entity::new("till_soil", ["hoe"]),
        ]);
        assert_eq!(corpus.len(), 2);
        assert!(corpus.get("hoe").is_some_and(Entity::is_root));
        assert_eq!(corpus.duplicate_ids(), ["hoe".to_owned()]);
    }

    #[test]
    fn iteration_keeps_authoring_order() {
        let corpus: Corpus = [
            Entity::new("zebra_fence", Vec::<String>::new()),
            Entity::new("apple_tree", Vec::<String>::new()),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<&str> = corpus.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ordered, ["zebra_fence", "apple_tree"]);
    }

    #[test]
    fn json_accepts_camel_case_prerequisites() {
        let json = r#"[
            {"id": "hoe"},
            {"id": "till_soil", "rawPrerequisites": ["hoe"], "kind": "action"}
        ]"#;
        let corpus = Corpus::from_json(json);
        assert!(corpus.is_ok());
        let corpus = corpus.unwrap_or_default();
        assert_eq!(
            corpus.get("till_soil").map(|e| e.raw_prerequisites.clone()),
            Some(vec!["hoe".to_owned()])
        );
        assert!(corpus.get("hoe").is_some_and(|e| e.tiers.is_empty()));
    }

    #[test]
    fn free_cost_detection() {
        assert!(ResourceCost::default().is_free());
        assert!(!ResourceCost::gold(1).is_free());
        let mut cost = ResourceCost::default();
        cost.seeds.insert("carrot".to_owned(), 0);
        assert!(cost.is_free());
    }
}
