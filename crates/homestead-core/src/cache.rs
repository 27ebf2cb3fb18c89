//! Prerequisite result cache keyed by progression fingerprint.
//!
//! A [`Fingerprint`] is a plain string built from exactly the snapshot
//! fields the resolver reads: the three counters and the four membership
//! collections, in sorted order. Resources, processes and location are
//! excluded because no token depends on them.
//!
//! The cache keeps one partition of results per fingerprint and at most
//! `capacity` partitions, least recently used first out. A capacity of one
//! means a fingerprint change evicts everything cached for the previous one.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use homestead_types::{PrerequisiteResult, ProgressionSnapshot};

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Deterministic digest of the resolver-relevant progression fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a snapshot.
    ///
    /// Each collection member is length-prefixed so ids containing the
    /// separator characters cannot collide.
    pub fn of(snapshot: &ProgressionSnapshot) -> Self {
        let mut out = format!(
            "h{}|s{}|p{}",
            snapshot.hero_level, snapshot.farm_stage, snapshot.farm_plots
        );
        push_set(&mut out, 'u', snapshot.unlocked_upgrades.iter());
        push_set(&mut out, 'c', snapshot.completed_cleanups.iter());
        push_set(&mut out, 't', snapshot.owned_tools.iter());
        out.push_str("|w");
        for (weapon, level) in &snapshot.owned_weapons {
            out.push_str(&format!("{}:{weapon}={level};", weapon.len()));
        }
        Self(out)
    }

    /// The fingerprint text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn push_set<'a>(out: &mut String, tag: char, items: impl Iterator<Item = &'a String>) {
    out.push('|');
    out.push(tag);
    for item in items {
        out.push_str(&format!("{}:{item};", item.len()));
    }
}

// ---------------------------------------------------------------------------
// ResultCache
// ---------------------------------------------------------------------------

/// Cache counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Fingerprint partitions currently held.
    pub partitions: usize,
    /// Cached results across all partitions.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that missed.
    pub misses: u64,
    /// Partitions evicted.
    pub evictions: u64,
}

/// Results for one fingerprint.
#[derive(Debug, Clone)]
struct Partition {
    fingerprint: Fingerprint,
    results: BTreeMap<String, PrerequisiteResult>,
}

/// Bounded, fingerprint-partitioned result cache.
///
/// Not synchronized; the resolver wraps it in a mutex.
#[derive(Debug, Clone)]
pub struct ResultCache {
    /// Most recently used partition first.
    partitions: VecDeque<Partition>,
    capacity: usize,
    stats: CacheStats,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` fingerprints (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            partitions: VecDeque::new(),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    /// Look up a cached result.
    pub fn get(&mut self, fingerprint: &Fingerprint, entity_id: &str) -> Option<PrerequisiteResult> {
        let hit = self
            .touch(fingerprint)
            .and_then(|partition| partition.results.get(entity_id))
            .cloned();
        if hit.is_some() {
            self.stats.hits = self.stats.hits.saturating_add(1);
        } else {
            self.stats.misses = self.stats.misses.saturating_add(1);
        }
        hit
    }

    /// Store a result, evicting the least recently used fingerprint if the
    /// cache is full.
    pub fn insert(&mut self, fingerprint: &Fingerprint, entity_id: &str, result: PrerequisiteResult) {
        if self.touch(fingerprint).is_none() {
            self.partitions.push_front(Partition {
                fingerprint: fingerprint.clone(),
                results: BTreeMap::new(),
            });
            while self.partitions.len() > self.capacity {
                if let Some(evicted) = self.partitions.pop_back() {
                    self.stats.evictions = self.stats.evictions.saturating_add(1);
                    tracing::debug!(
                        fingerprint = %evicted.fingerprint,
                        entries = evicted.results.len(),
                        "Evicted prerequisite cache partition"
                    );
                }
            }
        }
        if let Some(partition) = self.partitions.front_mut() {
            partition.results.insert(String::from(entity_id), result);
        }
    }

    /// Drop every cached result. Counters are kept.
    pub fn clear(&mut self) {
        self.partitions.clear();
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            partitions: self.partitions.len(),
            entries: self.partitions.iter().map(|p| p.results.len()).sum(),
            ..self.stats
        }
    }

    /// Move the partition for `fingerprint` to the front and return it.
    fn touch(&mut self, fingerprint: &Fingerprint) -> Option<&mut Partition> {
        let position = self
            .partitions
            .iter()
            .position(|p| &p.fingerprint == fingerprint)?;
        if position > 0 {
            let partition = self.partitions.remove(position)?;
            self.partitions.push_front(partition);
        }
        self.partitions.front_mut()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
