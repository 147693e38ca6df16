//! Terminal-status table.
//!
//! What "done" means for each (action, resource kind) pair is data, not
//! branching: adding a kind or an action is a new row.

use crate::aura::{Action, ResourceKind, ResourceStatus};

/// A predicate over a resource status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Status is one of the listed values.
    StatusIn(&'static [&'static str]),
    /// Status is none of the listed values.
    StatusNotIn(&'static [&'static str]),
}

impl Condition {
    /// Evaluates the predicate, ignoring case.
    #[must_use]
    pub fn holds(&self, status: &ResourceStatus) -> bool {
        let status = status.as_str();
        match self {
            Self::StatusIn(values) => values.iter().any(|v| v.eq_ignore_ascii_case(status)),
            Self::StatusNotIn(values) => !values.iter().any(|v| v.eq_ignore_ascii_case(status)),
        }
    }
}

/// How the poller recognizes completion of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// Status that must be seen at least once before `done` is trusted.
    pub transit: Option<Condition>,
    /// Terminal predicate.
    pub done: Condition,
    /// A 404 on the resource counts as completion.
    pub absent_is_complete: bool,
}

const RUNNING: &[&str] = &["running"];
const PAUSED: &[&str] = &["paused"];
const READY: &[&str] = &["ready"];
const SETTLED: &[&str] = &["running", "paused"];
const TEARING_DOWN: &[&str] = &["deleting", "destroying", "updating", "pending"];

const fn reach(done: &'static [&'static str]) -> Expectation {
    Expectation {
        transit: None,
        done: Condition::StatusIn(done),
        absent_is_complete: false,
    }
}

const GONE: Expectation = Expectation {
    transit: None,
    done: Condition::StatusNotIn(TEARING_DOWN),
    absent_is_complete: true,
};

// An update is only done once the instance has left and re-entered a settled
// status; a resize of a paused instance settles back to paused.
const UPDATED: Expectation = Expectation {
    transit: Some(Condition::StatusNotIn(SETTLED)),
    done: Condition::StatusIn(SETTLED),
    absent_is_complete: false,
};

const TABLE: &[(Action, ResourceKind, Expectation)] = &[
    (Action::Create, ResourceKind::Instance, reach(RUNNING)),
    (Action::Resume, ResourceKind::Instance, reach(RUNNING)),
    (Action::Pause, ResourceKind::Instance, reach(PAUSED)),
    (Action::Update, ResourceKind::Instance, UPDATED),
    (Action::Delete, ResourceKind::Instance, GONE),
    (Action::Create, ResourceKind::CustomerManagedKey, reach(READY)),
    (Action::Delete, ResourceKind::CustomerManagedKey, GONE),
];

/// Looks up the completion rule for an action on a resource kind.
///
/// Returns `None` for actions that complete synchronously (rename) or that do
/// not apply to the kind.
#[must_use]
pub fn expectation(action: Action, kind: ResourceKind) -> Option<&'static Expectation> {
    TABLE
        .iter()
        .find(|(a, k, _)| *a == action && *k == kind)
        .map(|(_, _, expectation)| expectation)
}
