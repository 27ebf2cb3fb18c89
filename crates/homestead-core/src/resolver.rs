//! Prerequisite resolution against a progression snapshot.
//!
//! [`PrerequisiteResolver`] owns a reference to the current corpus, the
//! resolver rule tables, and a fingerprint-partitioned result cache. It
//! never mutates the snapshot and never fails: an unknown or unresolvable
//! token resolves to unsatisfied with a reason.
//!
//! Reason strings are part of the public contract. They are shown verbatim
//! to players and copied into audit diagnostics.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use homestead_types::{Corpus, Entity, PrerequisiteResult, ProgressionSnapshot};

use crate::cache::{CacheStats, Fingerprint, ResultCache};
use crate::config::ResolverRules;
use crate::token::{PrerequisiteToken, normalize};

/// Resolves prerequisite tokens and whole entities.
///
/// Safe to share between threads. Cache lookups, computation of a missing
/// entry and its insertion happen under one lock, and a corpus swap takes
/// the same lock, so a cached result always matches the corpus and the
/// snapshot fingerprint it was computed from.
#[derive(Debug)]
pub struct PrerequisiteResolver {
    corpus: RwLock<Arc<Corpus>>,
    rules: ResolverRules,
    cache: Mutex<ResultCache>,
}

impl PrerequisiteResolver {
    /// Create a resolver over a corpus.
    pub fn new(corpus: Arc<Corpus>, rules: ResolverRules) -> Self {
        let cache = ResultCache::new(rules.cache_generations);
        Self {
            corpus: RwLock::new(corpus),
            rules,
            cache: Mutex::new(cache),
        }
    }

    /// The current corpus.
    pub fn corpus(&self) -> Arc<Corpus> {
        let guard = self.corpus.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// The resolver rule tables.
    pub const fn rules(&self) -> &ResolverRules {
        &self.rules
    }

    /// Swap in a new corpus version and drop every cached result.
    pub fn replace_corpus(&self, corpus: Arc<Corpus>) {
        let mut cache = self.lock_cache();
        {
            let mut current = self.corpus.write().unwrap_or_else(PoisonError::into_inner);
            *current = corpus;
        }
        cache.clear();
        tracing::info!("Resolver corpus replaced, cache cleared");
    }

    /// Parse a raw token against the current corpus.
    pub fn parse(&self, raw: &str) -> PrerequisiteToken {
        PrerequisiteToken::parse(raw, &self.rules.stage_plot_thresholds, &self.corpus())
    }

    /// Resolve a single raw token.
    pub fn resolve(&self, token: &str, snapshot: &ProgressionSnapshot) -> PrerequisiteResult {
        self.resolve_in(&self.corpus(), token, snapshot)
    }

    /// Resolve every token of an entity without touching the cache.
    ///
    /// All tokens are evaluated; the result lists every unmet one.
    pub fn check_entity(&self, entity: &Entity, snapshot: &ProgressionSnapshot) -> PrerequisiteResult {
        self.check_entity_in(&self.corpus(), entity, snapshot)
    }

    /// Resolve an entity by id, answering from the cache when possible.
    ///
    /// An id missing from the corpus is unsatisfied.
    pub fn check(&self, entity_id: &str, snapshot: &ProgressionSnapshot) -> PrerequisiteResult {
        let fingerprint = Fingerprint::of(snapshot);
        let mut cache = self.lock_cache();
        if let Some(hit) = cache.get(&fingerprint, entity_id) {
            return hit;
        }

        let corpus = self.corpus();
        let result = corpus.get(entity_id).map_or_else(
            || {
                PrerequisiteResult::unsatisfied(
                    entity_id,
                    format!("Unknown entity '{entity_id}'"),
                )
            },
            |entity| self.check_entity_in(&corpus, entity, snapshot),
        );
        cache.insert(&fingerprint, entity_id, result.clone());
        result
    }

    /// Ids of entities whose prerequisites are all met but which are not
    /// yet unlocked or completed, in corpus order.
    pub fn unlockable_entities(&self, snapshot: &ProgressionSnapshot) -> Vec<String> {
        self.corpus()
            .iter()
            .filter(|e| !snapshot.has_upgrade(&e.id) && !snapshot.has_cleanup(&e.id))
            .filter(|e| self.check(&e.id, snapshot).satisfied)
            .map(|e| e.id.clone())
            .collect()
    }

    /// The fingerprint `check` would use for this snapshot.
    pub fn fingerprint(snapshot: &ProgressionSnapshot) -> Fingerprint {
        Fingerprint::of(snapshot)
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_entity_in(
        &self,
        corpus: &Corpus,
        entity: &Entity,
        snapshot: &ProgressionSnapshot,
    ) -> PrerequisiteResult {
        if entity.is_root() {
            return PrerequisiteResult::satisfied();
        }
        entity
            .raw_prerequisites
            .iter()
            .map(|token| self.resolve_in(corpus, token, snapshot))
            .collect()
    }

    fn resolve_in(
        &self,
        corpus: &Corpus,
        raw: &str,
        snapshot: &ProgressionSnapshot,
    ) -> PrerequisiteResult {
        let normalized = normalize(raw);
        if is_explicitly_completed(raw, &normalized, snapshot) {
            return PrerequisiteResult::satisfied();
        }

        let token = PrerequisiteToken::parse(raw, &self.rules.stage_plot_thresholds, corpus);
        let outcome = evaluate(&token, snapshot);
        match outcome {
            Ok(()) => PrerequisiteResult::satisfied(),
            Err(reason) => {
                tracing::trace!(token = raw, %reason, "Prerequisite unmet");
                PrerequisiteResult::unsatisfied(raw, reason)
            }
        }
    }
}

/// Any token counts as met once it appears among the completed cleanups or
/// unlocked upgrades, whatever its typed form.
fn is_explicitly_completed(raw: &str, normalized: &str, snapshot: &ProgressionSnapshot) -> bool {
    [raw, normalized]
        .iter()
        .any(|t| snapshot.has_cleanup(t) || snapshot.has_upgrade(t))
}

/// Evaluate a parsed token, returning the unmet reason on failure.
fn evaluate(token: &PrerequisiteToken, snapshot: &ProgressionSnapshot) -> Result<(), String> {
    match token {
        PrerequisiteToken::Crafted(name) => {
            let owned = snapshot.owns_tool(name)
                || snapshot.weapon_level(name).is_some_and(|level| level > 0);
            if owned {
                Ok(())
            } else {
                Err(format!("Crafted item '{name}' required"))
            }
        }
        PrerequisiteToken::FarmStage(required) => {
            if snapshot.farm_stage >= *required {
                Ok(())
            } else {
                Err(format!(
                    "Farm stage {required} required, current {}",
                    snapshot.farm_stage
                ))
            }
        }
        PrerequisiteToken::HeroLevel(required) => {
            if snapshot.hero_level >= *required {
                Ok(())
            } else {
                Err(format!(
                    "Hero level {required} required, current {}",
                    snapshot.hero_level
                ))
            }
        }
        PrerequisiteToken::Blueprint(name) => {
            if snapshot.has_upgrade(name) {
                Ok(())
            } else {
                Err(format!("Blueprint '{name}' not unlocked"))
            }
        }
        PrerequisiteToken::Deed(deed) => {
            if snapshot.has_upgrade(deed) {
                Ok(())
            } else {
                Err(format!("Deed '{deed}' not acquired"))
            }
        }
        PrerequisiteToken::StageName { name, plots } => {
            if snapshot.farm_plots >= *plots {
                Ok(())
            } else {
                Err(format!(
                    "Stage '{name}' requires {plots} farm plots, current {}",
                    snapshot.farm_plots
                ))
            }
        }
        PrerequisiteToken::EntityRef(id) => {
            if snapshot.has_upgrade(id) || snapshot.has_cleanup(id) {
                Ok(())
            } else {
                Err(format!("Requires '{id}' to be unlocked"))
            }
        }
        PrerequisiteToken::Unknown(raw) => Err(format!("Unknown prerequisite token '{raw}'")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
