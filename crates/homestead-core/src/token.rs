//! Typed prerequisite token grammar.
//!
//! Every raw token is parsed once into a [`PrerequisiteToken`] and then
//! dispatched on by variant. The parse order is a priority chain; the first
//! pattern that matches wins:
//!
//! 1. `craft_<name>` -- crafted item
//! 2. `farm_stage_<N>` -- minimum farm stage
//! 3. `hero_level_<N>` -- minimum hero level
//! 4. `blueprint_<name>` -- unlocked blueprint
//! 5. anything containing `deed` -- acquired deed
//! 6. a configured stage name -- minimum plot count
//! 7. an exact entity id in the corpus -- unlocked/completed entity
//! 8. anything else -- unknown, never satisfied
//!
//! A token that is both a typed gate and an entity id is treated as the
//! typed gate. Entity references are matched verbatim, never normalized,
//! so the resolver and the dependency graph agree on every edge.
//!
//! Explicit completion (the normalized token itself appearing among the
//! player's unlocked upgrades or completed cleanups) depends on the
//! snapshot rather than the token text, so the resolver checks it before
//! dispatching instead of it being a parse outcome.

use std::collections::BTreeMap;

use homestead_types::Corpus;

/// Prefix of crafted-item gates.
pub const CRAFT_PREFIX: &str = "craft_";
/// Prefix of farm-stage gates.
pub const FARM_STAGE_PREFIX: &str = "farm_stage_";
/// Prefix of hero-level gates.
pub const HERO_LEVEL_PREFIX: &str = "hero_level_";
/// Prefix of blueprint gates.
pub const BLUEPRINT_PREFIX: &str = "blueprint_";
/// Substring marking deed gates.
pub const DEED_MARKER: &str = "deed";

/// A parsed prerequisite token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrerequisiteToken {
    /// The named tool or weapon must be owned.
    Crafted(String),
    /// The farm must be at least this stage.
    FarmStage(u32),
    /// The hero must be at least this level.
    HeroLevel(u32),
    /// The named blueprint must be unlocked.
    Blueprint(String),
    /// The deed (full normalized token) must be unlocked.
    Deed(String),
    /// A named stage, satisfied by owning enough plots.
    StageName {
        /// Stage name.
        name: String,
        /// Minimum plot count.
        plots: u32,
    },
    /// A bare reference to another corpus entity.
    EntityRef(String),
    /// Nothing recognizable.
    Unknown(String),
}

impl PrerequisiteToken {
    /// Parse a raw token against the stage table and corpus.
    pub fn parse(raw: &str, stage_plots: &BTreeMap<String, u32>, corpus: &Corpus) -> Self {
        let normalized = normalize(raw);

        if let Some(name) = non_empty_suffix(&normalized, CRAFT_PREFIX) {
            return Self::Crafted(String::from(name));
        }
        if let Some(stage) = numeric_suffix(&normalized, FARM_STAGE_PREFIX) {
            return Self::FarmStage(stage);
        }
        if let Some(level) = numeric_suffix(&normalized, HERO_LEVEL_PREFIX) {
            return Self::HeroLevel(level);
        }
        if let Some(name) = non_empty_suffix(&normalized, BLUEPRINT_PREFIX) {
            return Self::Blueprint(String::from(name));
        }
        if normalized.contains(DEED_MARKER) {
            return Self::Deed(normalized);
        }
        if let Some(&plots) = stage_plots.get(&normalized) {
            return Self::StageName {
                name: normalized,
                plots,
            };
        }
        if corpus.contains(raw) {
            return Self::EntityRef(String::from(raw));
        }
        Self::Unknown(String::from(raw))
    }

    /// Whether the token matched any pattern.
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Whether the token is a typed gate rather than an entity reference.
    pub const fn is_typed_gate(&self) -> bool {
        !matches!(self, Self::EntityRef(_) | Self::Unknown(_))
    }
}

/// Canonical form of a raw token: trimmed, lowercase, with spaces and
/// hyphens folded to underscores.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

fn non_empty_suffix<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    token.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

fn numeric_suffix(token: &str, prefix: &str) -> Option<u32> {
    token.strip_prefix(prefix).and_then(|rest| rest.parse().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use homestead_types::Entity;

    use super::*;

    fn stages() -> BTreeMap<String, u32> {
        BTreeMap::from([(String::from("homestead"), 40)])
    }

    fn corpus() -> Corpus {
        Corpus::from_entities([
            Entity::new("hoe", Vec::<String>::new()),
            Entity::new("craft_table", Vec::<String>::new()),
            Entity::new("farm_stage_2", Vec::<String>::new()),
        ])
    }

    fn parse(raw: &str) -> PrerequisiteToken {
        PrerequisiteToken::parse(raw, &stages(), &corpus())
    }

    #[test]
    fn typed_patterns() {
        assert_eq!(parse("craft_axe"), PrerequisiteToken::Crafted("axe".into()));
        assert_eq!(parse("farm_stage_3"), PrerequisiteToken::FarmStage(3));
        assert_eq!(parse("hero_level_12"), PrerequisiteToken::HeroLevel(12));
        assert_eq!(
            parse("blueprint_iron_sword"),
            PrerequisiteToken::Blueprint("iron_sword".into())
        );
        assert_eq!(
            parse("north_field_deed"),
            PrerequisiteToken::Deed("north_field_deed".into())
        );
        assert_eq!(
            parse("homestead"),
            PrerequisiteToken::StageName { name: "homestead".into(), plots: 40 }
        );
        assert_eq!(parse("hoe"), PrerequisiteToken::EntityRef("hoe".into()));
    }

    #[test]
    fn typed_gate_wins_over_entity_id() {
        assert_eq!(parse("craft_table"), PrerequisiteToken::Crafted("table".into()));
        assert_eq!(parse("farm_stage_2"), PrerequisiteToken::FarmStage(2));
    }

    #[test]
    fn malformed_numbers_fall_through() {
        assert_eq!(
            parse("farm_stage_three"),
            PrerequisiteToken::Unknown("farm_stage_three".into())
        );
        assert_eq!(parse("hero_level_"), PrerequisiteToken::Unknown("hero_level_".into()));
        assert_eq!(parse("craft_"), PrerequisiteToken::Unknown("craft_".into()));
    }

    #[test]
    fn normalization_applies_before_matching() {
        assert_eq!(parse("  Farm-Stage 4 "), PrerequisiteToken::FarmStage(4));
        assert_eq!(normalize(" Blueprint Iron-Sword"), "blueprint_iron_sword");
    }

    #[test]
    fn entity_references_match_exact_ids_only() {
        assert_eq!(parse("hoe"), PrerequisiteToken::EntityRef("hoe".into()));
        assert_eq!(parse("HOE"), PrerequisiteToken::Unknown("HOE".into()));
        assert_eq!(parse(" hoe"), PrerequisiteToken::Unknown(" hoe".into()));
        assert!(!parse("Hoe").is_recognized());
    }

    #[test]
    fn unknown_is_not_recognized() {
        let token = parse("totally_bogus_token");
        assert!(!token.is_recognized());
        assert!(!token.is_typed_gate());
        assert!(parse("hoe").is_recognized());
        assert!(!parse("hoe").is_typed_gate());
        assert!(parse("farm_stage_1").is_typed_gate());
    }
}
