//! Rules configuration, token grammar and prerequisite resolution for the
//! Homestead unlock engine.
//!
//! This crate is the runtime heart of the engine. It sits between
//! `homestead-types` (the data model) and the façade and audit crates that
//! compose its answers.
//!
//! # Modules
//!
//! - [`config`] -- YAML rule tables ([`RulesConfig`])
//! - [`token`] -- Typed prerequisite grammar ([`PrerequisiteToken`])
//! - [`cache`] -- Progression [`Fingerprint`]s and the [`ResultCache`]
//! - [`resolver`] -- [`PrerequisiteResolver`]

pub mod cache;
pub mod config;
pub mod resolver;
pub mod token;

pub use cache::{CacheStats, Fingerprint, ResultCache};
pub use config::{ActionRules, AuditRules, ConfigError, LoggingConfig, ResolverRules, RulesConfig};
pub use resolver::PrerequisiteResolver;
pub use token::{PrerequisiteToken, normalize};
