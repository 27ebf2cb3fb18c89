//! Configuration loading and typed rule tables for the unlock engine.
//!
//! The canonical rules live in `homestead-rules.yaml`. Every table the
//! engine consults (stage-name plot thresholds, tool gates, stage tags,
//! essential materials, the bootstrap economy) is injected from here so
//! non-gameplay variants can ship their own. Every field has a default, so
//! an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding [`AuditRules::starting_gold`].
pub const STARTING_GOLD_ENV: &str = "HOMESTEAD_STARTING_GOLD";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value that does not parse.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidOverride {
        /// The environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level rules configuration.
///
/// Mirrors the structure of `homestead-rules.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Prerequisite resolver tables and cache sizing.
    #[serde(default)]
    pub resolver: ResolverRules,

    /// Action-kind-specific limits for the validation façade.
    #[serde(default)]
    pub actions: ActionRules,

    /// Corpus audit tables and bootstrap economy constants.
    #[serde(default)]
    pub audit: AuditRules,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RulesConfig {
    /// Load rules from a YAML file at the given path.
    ///
    /// `HOMESTEAD_STARTING_GOLD` overrides `audit.starting_gold` when set.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse rules from a YAML string, applying environment overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.audit.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse rules from a YAML string, ignoring the environment.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Prerequisite resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolverRules {
    /// Named farm stage -> minimum number of farm plots.
    #[serde(default = "default_stage_plot_thresholds")]
    pub stage_plot_thresholds: BTreeMap<String, u32>,

    /// Number of progression fingerprints whose results are retained.
    ///
    /// `1` keeps only the latest fingerprint; larger values keep the most
    /// recently used fingerprints.
    #[serde(default = "default_cache_generations")]
    pub cache_generations: usize,
}

impl Default for ResolverRules {
    fn default() -> Self {
        Self {
            stage_plot_thresholds: default_stage_plot_thresholds(),
            cache_generations: default_cache_generations(),
        }
    }
}

/// Validation façade limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionRules {
    /// Maximum concurrent crafting processes.
    #[serde(default = "default_crafting_capacity")]
    pub crafting_capacity: u32,

    /// Remaining energy below which a warning is raised.
    #[serde(default = "default_low_energy_warning")]
    pub low_energy_warning: u32,
}

impl Default for ActionRules {
    fn default() -> Self {
        Self {
            crafting_capacity: default_crafting_capacity(),
            low_energy_warning: default_low_energy_warning(),
        }
    }
}

/// Corpus audit tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuditRules {
    /// Gold a new player starts with.
    #[serde(default = "default_starting_gold")]
    pub starting_gold: u32,

    /// Entity whose first tier must be affordable from a cold start.
    #[serde(default = "default_bootstrap_entity")]
    pub bootstrap_entity: String,

    /// Action id -> tool the action should require.
    #[serde(default = "default_tool_gates")]
    pub tool_gates: BTreeMap<String, String>,

    /// Category tag -> minimum farm stage entities with the tag should require.
    #[serde(default = "default_stage_tags")]
    pub stage_tags: BTreeMap<String, u32>,

    /// Materials at least one entity must produce.
    #[serde(default = "default_essential_materials")]
    pub essential_materials: Vec<String>,
}

impl AuditRules {
    /// Override `starting_gold` from [`STARTING_GOLD_ENV`] when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(STARTING_GOLD_ENV) {
            let parsed = value.trim().parse::<u32>();
            self.starting_gold = parsed.map_err(|_parse| ConfigError::InvalidOverride {
                var: STARTING_GOLD_ENV,
                value,
            })?;
        }
        Ok(())
    }
}

impl Default for AuditRules {
    fn default() -> Self {
        Self {
            starting_gold: default_starting_gold(),
            bootstrap_entity: default_bootstrap_entity(),
            tool_gates: default_tool_gates(),
            stage_tags: default_stage_tags(),
            essential_materials: default_essential_materials(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_stage_plot_thresholds() -> BTreeMap<String, u32> {
    BTreeMap::from([
        (String::from("smallholding"), 10),
        (String::from("homestead"), 40),
        (String::from("estate"), 90),
    ])
}

const fn default_cache_generations() -> usize {
    1
}

const fn default_crafting_capacity() -> u32 {
    3
}

const fn default_low_energy_warning() -> u32 {
    5
}

const fn default_starting_gold() -> u32 {
    50
}

fn default_bootstrap_entity() -> String {
    String::from("blueprint_rusty_sword")
}

fn default_tool_gates() -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from("till_soil"), String::from("hoe")),
        (String::from("water_crops"), String::from("watering_can")),
        (String::from("chop_tree"), String::from("axe")),
        (String::from("break_rock"), String::from("pickaxe")),
    ])
}

fn default_stage_tags() -> BTreeMap<String, u32> {
    BTreeMap::from([
        (String::from("orchard"), 2),
        (String::from("livestock"), 3),
        (String::from("greenhouse"), 4),
    ])
}

fn default_essential_materials() -> Vec<String> {
    vec![
        String::from("wood"),
        String::from("stone"),
        String::from("fiber"),
    ]
}

fn default_log_level() -> String {
    String::from("info")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = RulesConfig::parse_without_env("");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config, RulesConfig::default());
        assert_eq!(config.audit.starting_gold, 50);
        assert_eq!(config.resolver.cache_generations, 1);
        assert_eq!(
            config.resolver.stage_plot_thresholds.get("homestead").copied(),
            Some(40)
        );
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r"
audit:
  starting_gold: 120
  tool_gates:
    mow_grass: scythe
resolver:
  cache_generations: 4
";
        let config = RulesConfig::parse_without_env(yaml).unwrap_or_default();
        assert_eq!(config.audit.starting_gold, 120);
        assert_eq!(config.audit.tool_gates.len(), 1);
        assert_eq!(config.audit.bootstrap_entity, "blueprint_rusty_sword");
        assert_eq!(config.resolver.cache_generations, 4);
        assert_eq!(config.actions.crafting_capacity, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn shipped_rules_file_matches_defaults() {
        let yaml = include_str!("../../../homestead-rules.yaml");
        let config = RulesConfig::parse_without_env(yaml);
        assert!(config.is_ok());
        assert_eq!(config.unwrap_or_default(), RulesConfig::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = RulesConfig::parse_without_env("audit: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = RulesConfig::from_file(Path::new("/nonexistent/homestead-rules.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
