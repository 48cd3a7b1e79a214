//! Observed/desired value pairs for mutable sub-attributes.

/// The previously observed ("state") and newly requested ("plan") values
/// of one mutable sub-attribute of a resource.
///
/// Both sides are optional. A step of the orchestration runs only when
/// the two differ: equal pairs are skipped, not re-sent, to avoid
/// unnecessary API load and spurious audit events on the control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair<T> {
    /// What was last observed on the control plane.
    pub state: Option<T>,
    /// What the caller now wants.
    pub plan: Option<T>,
}

impl<T> Default for Pair<T> {
    fn default() -> Self {
        Self {
            state: None,
            plan: None,
        }
    }
}

impl<T> Pair<T> {
    /// Build a pair from both sides.
    #[must_use]
    pub fn new(state: Option<T>, plan: Option<T>) -> Self {
        Self { state, plan }
    }

    /// A pair that introduces a value where none was observed.
    #[must_use]
    pub fn set(plan: T) -> Self {
        Self {
            state: None,
            plan: Some(plan),
        }
    }

    /// A pair that removes a previously observed value.
    #[must_use]
    pub fn clear(state: T) -> Self {
        Self {
            state: Some(state),
            plan: None,
        }
    }
}

impl<T: Clone> Pair<T> {
    /// A pair whose two sides agree (the no-op case).
    #[must_use]
    pub fn unchanged(value: T) -> Self {
        Self {
            state: Some(value.clone()),
            plan: Some(value),
        }
    }
}

impl<T: PartialEq> Pair<T> {
    /// Whether an API call must be issued for this sub-attribute.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.state != self.plan
    }
}
