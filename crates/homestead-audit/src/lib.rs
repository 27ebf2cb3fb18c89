//! Corpus audit for the Homestead unlock engine.
//!
//! Runs once over a full corpus, independent of any player, and reports
//! structured [`Finding`](homestead_types::Finding)s. Structural problems
//! (cycles, dangling tokens, an unwinnable bootstrap economy) are errors
//! that must be fixed in data before shipping. Gating inconsistencies and
//! unproduced materials are warnings.
//!
//! # Modules
//!
//! - [`auditor`] -- The individual checks and [`CorpusAuditor::audit`]
//! - [`report`] -- [`AuditReport`] aggregation

pub mod auditor;
pub mod report;

pub use auditor::CorpusAuditor;
pub use report::AuditReport;
