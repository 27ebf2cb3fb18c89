//! Action validation for the Homestead unlock engine.
//!
//! Answers "can the player do this right now?" by composing resource
//! sufficiency, prerequisite resolution and action-kind-specific rules into
//! one [`ActionValidationResult`](homestead_types::ActionValidationResult).
//!
//! # Modules
//!
//! - [`validation`] -- The [`ActionValidator`] pipeline

pub mod validation;

pub use validation::ActionValidator;
