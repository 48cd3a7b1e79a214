//! Membership diff for unordered identifier sets.
//!
//! The control plane addresses child entities (custom domains, env-group
//! service links) by identifier, never by position, so reconciliation is
//! a set difference: what to add, what to remove. Output order is
//! unspecified.

use std::collections::HashSet;

/// Result of diffing a desired identifier set against an observed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    /// Desired identifiers absent from the observed set.
    pub to_add: Vec<String>,
    /// Observed identifiers absent from the desired set.
    pub to_remove: Vec<String>,
}

impl SetDiff {
    /// Whether the two sets already agree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the add-set and remove-set between two identifier collections.
///
/// Duplicates within either input collapse to one: membership is
/// idempotent, not a multiset.
#[must_use]
pub fn diff(desired: &[String], observed: &[String]) -> SetDiff {
    let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();
    let observed_set: HashSet<&str> = observed.iter().map(String::as_str).collect();

    SetDiff {
        to_add: desired_set
            .difference(&observed_set)
            .map(|id| (*id).to_string())
            .collect(),
        to_remove: observed_set
            .difference(&desired_set)
            .map(|id| (*id).to_string())
            .collect(),
    }
}
