//! Shared type definitions for the Homestead unlock engine.
//!
//! This crate is the single source of truth for every value that crosses
//! the engine's public boundary. Types flow downstream to `TypeScript` via
//! `ts-rs` for the content editor and the in-game unlock panels.
//!
//! # Modules
//!
//! - [`entity`] -- Catalog entities, tier costs and the [`Corpus`]
//! - [`progression`] -- The read-only [`ProgressionSnapshot`]
//! - [`results`] -- [`PrerequisiteResult`]
//! - [`actions`] -- Action requests and [`ActionValidationResult`]
//! - [`findings`] -- Corpus audit [`Finding`]s

pub mod actions;
pub mod entity;
pub mod findings;
pub mod progression;
pub mod results;

// Re-export all public types at crate root for convenience.
pub use actions::{
    ActionKind, ActionRequest, ActionValidationResult, IssueCategory, ResourceIssue, ResourceKind,
    ValidationIssue,
};
pub use entity::{Corpus, Entity, EntityKind, ResourceCost};
pub use findings::{Finding, FindingKind, FindingPayload, Severity};
pub use progression::{ProcessInstance, ProcessKind, ProgressionSnapshot, Resources};
pub use results::PrerequisiteResult;

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        // Entities
        let _ = crate::entity::EntityKind::export_all();
        let _ = crate::entity::ResourceCost::export_all();
        let _ = crate::entity::Entity::export_all();

        // Progression
        let _ = crate::progression::Resources::export_all();
        let _ = crate::progression::ProcessKind::export_all();
        let _ = crate::progression::ProcessInstance::export_all();
        let _ = crate::progression::ProgressionSnapshot::export_all();

        // Results
        let _ = crate::results::PrerequisiteResult::export_all();
        let _ = crate::actions::ActionKind::export_all();
        let _ = crate::actions::ActionRequest::export_all();
        let _ = crate::actions::IssueCategory::export_all();
        let _ = crate::actions::ResourceKind::export_all();
        let _ = crate::actions::ResourceIssue::export_all();
        let _ = crate::actions::ValidationIssue::export_all();
        let _ = crate::actions::ActionValidationResult::export_all();

        // Findings
        let _ = crate::findings::Severity::export_all();
        let _ = crate::findings::FindingKind::export_all();
        let _ = crate::findings::FindingPayload::export_all();
        let _ = crate::findings::Finding::export_all();
    }
}
