//! The entity dependency graph.
//!
//! Built once per corpus version in two passes: one node per entity, then
//! one edge per raw token that names another entity exactly. Tokens that do
//! not name an entity are dropped here; the corpus auditor reports them.
//!
//! Depth is the topological distance from the nearest zero-prerequisite
//! root. Nodes that sit on a cycle, or depend on one, never receive a depth
//! and report `None` rather than a numeric placeholder.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use homestead_types::Entity;

// ---------------------------------------------------------------------------
// GraphNode
// ---------------------------------------------------------------------------

/// One graph node per corpus entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Entity id.
    pub id: String,
    /// Ids of entities this node directly requires.
    pub prerequisites: BTreeSet<String>,
    /// Ids of entities that directly require this node.
    pub dependents: BTreeSet<String>,
    /// Topological depth, `None` if unreachable from a root.
    pub depth: Option<u32>,
}

impl GraphNode {
    fn new(id: &str) -> Self {
        Self {
            id: String::from(id),
            prerequisites: BTreeSet::new(),
            dependents: BTreeSet::new(),
            depth: None,
        }
    }
}

/// A cycle found by [`DependencyGraph::detect_circular_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Entity ids in dependency order; the last requires the first.
    pub path: Vec<String>,
    /// Always `true` for reported paths.
    pub is_cycle: bool,
}

/// Summary counts for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of entity-to-entity edges.
    pub edge_count: usize,
    /// Nodes with no prerequisites.
    pub root_count: usize,
    /// Nodes without a finalized depth.
    pub undepthed_count: usize,
    /// Deepest finalized depth.
    pub max_depth: Option<u32>,
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// Immutable entity-to-entity dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Nodes keyed by entity id.
    nodes: BTreeMap<String, GraphNode>,
}

impl DependencyGraph {
    /// Build the graph from a corpus and compute depths.
    ///
    /// Never fails. Tokens naming no entity are not edges; a repeated id
    /// merges into the node created by its first occurrence.
    pub fn build<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let entities: Vec<&Entity> = entities.into_iter().collect();

        // Pass 1: one node per entity.
        let mut nodes: BTreeMap<String, GraphNode> = BTreeMap::new();
        for entity in &entities {
            nodes
                .entry(entity.id.clone())
                .or_insert_with(|| GraphNode::new(&entity.id));
        }

        // Pass 2: edges for tokens that name an existing entity.
        let mut dropped: usize = 0;
        for entity in &entities {
            for token in &entity.raw_prerequisites {
                if !nodes.contains_key(token) {
                    dropped = dropped.saturating_add(1);
                    continue;
                }
                if let Some(node) = nodes.get_mut(&entity.id) {
                    node.prerequisites.insert(token.clone());
                }
                if let Some(target) = nodes.get_mut(token) {
                    target.dependents.insert(entity.id.clone());
                }
            }
        }

        let mut graph = Self { nodes };
        graph.calculate_depths();

        let stats = graph.stats();
        tracing::debug!(
            nodes = stats.node_count,
            edges = stats.edge_count,
            roots = stats.root_count,
            undepthed = stats.undepthed_count,
            non_edge_tokens = dropped,
            "Dependency graph built"
        );
        graph
    }

    /// Look up a node by entity id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Iterate all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of nodes with no prerequisites.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| n.prerequisites.is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Depth of a node; `None` for unknown ids and for cycle-bound nodes.
    pub fn depth(&self, id: &str) -> Option<u32> {
        self.nodes.get(id).and_then(|n| n.depth)
    }

    /// Deepest finalized depth in the graph.
    pub fn max_depth(&self) -> Option<u32> {
        self.nodes.values().filter_map(|n| n.depth).max()
    }

    /// Ids of nodes that never received a depth.
    pub fn nodes_without_depth(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| n.depth.is_none())
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Summary counts.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.nodes.values().map(|n| n.prerequisites.len()).sum(),
            root_count: self
                .nodes
                .values()
                .filter(|n| n.prerequisites.is_empty())
                .count(),
            undepthed_count: self.nodes.values().filter(|n| n.depth.is_none()).count(),
            max_depth: self.max_depth(),
        }
    }

    /// Transitive closure of the prerequisites relation.
    ///
    /// Terminates on cycles: expansion stops at already-visited nodes. The
    /// starting id appears in its own closure only if it sits on a cycle.
    pub fn get_all_prerequisites(&self, id: &str) -> BTreeSet<String> {
        self.closure(id, |node| &node.prerequisites)
    }

    /// Transitive closure of the dependents relation.
    pub fn get_all_dependents(&self, id: &str) -> BTreeSet<String> {
        self.closure(id, |node| &node.dependents)
    }

    fn closure<F>(&self, id: &str, edges: F) -> BTreeSet<String>
    where
        F: Fn(&GraphNode) -> &BTreeSet<String>,
    {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut pending: Vec<&str> = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            for next in edges(node) {
                if seen.insert(next.clone()) {
                    pending.push(next);
                }
            }
        }
        seen
    }

    /// Find cycles with a depth-first search started from every unvisited
    /// node.
    ///
    /// Each back edge to a node still on the recursion stack yields one
    /// report whose path runs from that node through the current node.
    pub fn detect_circular_dependencies(&self) -> Vec<CycleReport> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut stack: Vec<&str> = Vec::new();
        let mut cycles: Vec<CycleReport> = Vec::new();

        for id in self.nodes.keys() {
            if !visited.contains(id.as_str()) {
                self.visit(id, &mut visited, &mut stack, &mut cycles);
            }
        }
        cycles
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        visited: &mut BTreeSet<&'a str>,
        stack: &mut Vec<&'a str>,
        cycles: &mut Vec<CycleReport>,
    ) {
        visited.insert(id);
        stack.push(id);

        if let Some(node) = self.nodes.get(id) {
            for prerequisite in &node.prerequisites {
                let prerequisite = prerequisite.as_str();
                if let Some(start) = stack.iter().position(|s| *s == prerequisite) {
                    let path: Vec<String> = stack
                        .get(start..)
                        .unwrap_or_default()
                        .iter()
                        .map(|s| String::from(*s))
                        .collect();
                    cycles.push(CycleReport {
                        path,
                        is_cycle: true,
                    });
                } else if !visited.contains(prerequisite) {
                    self.visit(prerequisite, visited, stack, cycles);
                }
            }
        }

        stack.pop();
    }

    /// Assign depths by ready-queue propagation from the roots.
    ///
    /// A node is finalized only once every prerequisite is finalized; its
    /// depth is one more than the deepest prerequisite. Safe to call again.
    pub fn calculate_depths(&mut self) {
        let mut remaining: BTreeMap<String, usize> = self
            .nodes
            .values()
            .map(|n| (n.id.clone(), n.prerequisites.len()))
            .collect();

        let mut depths: BTreeMap<String, u32> = BTreeMap::new();
        let mut ready: VecDeque<String> = VecDeque::new();
        for node in self.nodes.values() {
            if node.prerequisites.is_empty() {
                depths.insert(node.id.clone(), 0);
                ready.push_back(node.id.clone());
            }
        }

        while let Some(id) = ready.pop_front() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for dependent in &node.dependents {
                let Some(count) = remaining.get_mut(dependent) else {
                    continue;
                };
                *count = count.saturating_sub(1);
                if *count > 0 {
                    continue;
                }
                let deepest = self
                    .nodes
                    .get(dependent)
                    .and_then(|d| d.prerequisites.iter().filter_map(|p| depths.get(p)).max())
                    .copied()
                    .unwrap_or(0);
                depths.insert(dependent.clone(), deepest.saturating_add(1));
                ready.push_back(dependent.clone());
            }
        }

        for node in self.nodes.values_mut() {
            node.depth = depths.get(&node.id).copied();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
