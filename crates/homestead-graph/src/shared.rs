//! Atomically swappable graph holder.
//!
//! Readers take an [`Arc`] to the current graph and keep using it for as
//! long as they like. A rebuild constructs the new graph off to the side and
//! swaps the pointer, so no reader ever observes a partially built graph.

use std::sync::{Arc, PoisonError, RwLock};

use homestead_types::Corpus;

use crate::graph::DependencyGraph;

/// Shared, swappable [`DependencyGraph`].
#[derive(Debug, Default)]
pub struct SharedGraph {
    current: RwLock<Arc<DependencyGraph>>,
}

impl SharedGraph {
    /// Wrap an already built graph.
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
        }
    }

    /// Build a graph from a corpus and wrap it.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        Self::new(DependencyGraph::build(corpus.iter()))
    }

    /// The current graph.
    pub fn load(&self) -> Arc<DependencyGraph> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the current graph, returning the previous one.
    pub fn replace(&self, graph: DependencyGraph) -> Arc<DependencyGraph> {
        let next = Arc::new(graph);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Rebuild from a new corpus version and swap it in.
    pub fn rebuild(&self, corpus: &Corpus) -> Arc<DependencyGraph> {
        let graph = DependencyGraph::build(corpus.iter());
        tracing::info!(nodes = graph.len(), "Dependency graph swapped");
        self.replace(graph)
    }
}

#[cfg(test)]
mod tests {
    use homestead_types::Entity;

    use super::*;

    #[test]
    fn readers_keep_their_snapshot_across_rebuild() {
        let shared = SharedGraph::from_corpus(&Corpus::from_entities([Entity::new(
            "hoe",
            Vec::<String>::new(),
        )]));
        let before = shared.load();

        let previous = shared.rebuild(&Corpus::from_entities([
            Entity::new("hoe", Vec::<String>::new()),
            Entity::new("till_soil", ["hoe"]),
        ]));

        assert_eq!(before.len(), 1);
        assert_eq!(previous.len(), 1);
        assert_eq!(shared.load().len(), 2);
        assert_eq!(shared.load().depth("till_soil"), Some(1));
    }

    #[test]
    fn concurrent_readers_see_whole_graphs() {
        let shared = Arc::new(SharedGraph::default());
        let corpus = Corpus::from_entities([
            Entity::new("hoe", Vec::<String>::new()),
            Entity::new("till_soil", ["hoe"]),
        ]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    (0..100).all(|_| {
                        let graph = shared.load();
                        graph.is_empty() || graph.len() == 2
                    })
                })
            })
            .collect();
        shared.rebuild(&corpus);

        for reader in readers {
            assert!(reader.join().unwrap_or(false));
        }
    }
}
