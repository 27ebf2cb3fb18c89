//! Prerequisite resolution results.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Outcome of resolving one token or every token of one entity.
///
/// Always returned, never thrown. An unknown or unresolvable token yields
/// `satisfied == false` with an explicit reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PrerequisiteResult {
    /// Whether every evaluated token is satisfied.
    pub satisfied: bool,
    /// Raw tokens that are not satisfied, in evaluation order.
    pub missing_tokens: Vec<String>,
    /// Human-readable reason for each unmet token, surfaced verbatim to users.
    pub reasons: Vec<String>,
}

impl PrerequisiteResult {
    /// A satisfied result with no diagnostics.
    pub const fn satisfied() -> Self {
        Self {
            satisfied: true,
            missing_tokens: Vec::new(),
            reasons: Vec::new(),
        }
    }

    /// An unsatisfied result for a single token.
    pub fn unsatisfied(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            missing_tokens: vec![token.into()],
            reasons: vec![reason.into()],
        }
    }

    /// Fold another result into this one.
    ///
    /// The merged result is satisfied only if both are; missing tokens and
    /// reasons are concatenated so no unmet requirement is hidden.
    pub fn merge(&mut self, other: Self) {
        self.satisfied = self.satisfied && other.satisfied;
        self.missing_tokens.extend(other.missing_tokens);
        self.reasons.extend(other.reasons);
    }
}

impl FromIterator<Self> for PrerequisiteResult {
    fn from_iter<T: IntoIterator<Item = Self>>(iter: T) -> Self {
        iter.into_iter().fold(Self::satisfied(), |mut acc, next| {
            acc.merge(next);
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_every_failure() {
        let combined: PrerequisiteResult = [
            PrerequisiteResult::unsatisfied("hoe", "Requires 'hoe' to be unlocked"),
            PrerequisiteResult::satisfied(),
            PrerequisiteResult::unsatisfied("farm_stage_3", "Farm stage 3 required, current 1"),
        ]
        .into_iter()
        .collect();
        assert!(!combined.satisfied);
        assert_eq!(combined.missing_tokens, ["hoe", "farm_stage_3"]);
        assert_eq!(combined.reasons.len(), 2);
    }

    #[test]
    fn empty_fold_is_satisfied() {
        let combined: PrerequisiteResult = std::iter::empty().collect();
        assert_eq!(combined, PrerequisiteResult::satisfied());
    }
}
