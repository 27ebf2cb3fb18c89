//! Aggregated audit results.

use std::collections::BTreeMap;

use serde::Serialize;

use homestead_graph::GraphStats;
use homestead_types::{Finding, FindingKind};

/// Every finding of one audit run plus the graph summary it was run on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Number of entities audited.
    pub entity_count: usize,
    /// Summary of the dependency graph.
    pub graph: GraphStats,
    /// Findings in check order.
    pub findings: Vec<Finding>,
}

impl AuditReport {
    /// Error findings.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    /// Warning findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    /// Number of error findings.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warning findings.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// A corpus ships only when it has no error findings.
    pub fn is_shippable(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Finding counts per kind.
    pub fn by_kind(&self) -> BTreeMap<FindingKind, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            let count = counts.entry(finding.kind).or_insert(0_usize);
            *count = count.saturating_add(1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AuditReport {
        AuditReport {
            entity_count: 3,
            graph: GraphStats::default(),
            findings: vec![
                Finding::new(FindingKind::DanglingPrerequisite, "a"),
                Finding::new(FindingKind::MissingToolGate, "b"),
                Finding::new(FindingKind::MissingToolGate, "c"),
            ],
        }
    }

    #[test]
    fn counts_split_by_severity() {
        let report = report();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(!report.is_shippable());
    }

    #[test]
    fn warnings_alone_are_shippable() {
        let mut report = report();
        report.findings.retain(|f| !f.is_error());
        assert!(report.is_shippable());
    }

    #[test]
    fn by_kind_groups_findings() {
        let counts = report().by_kind();
        assert_eq!(counts.get(&FindingKind::MissingToolGate), Some(&2));
        assert_eq!(counts.get(&FindingKind::DanglingPrerequisite), Some(&1));
        assert_eq!(counts.get(&FindingKind::CircularDependency), None);
    }
}
