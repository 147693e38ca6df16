//! Reconciler module.
//!
//! Turns the asynchronous remote API into blocking lifecycle operations:
//! a terminal-status table, the completion poller, and the operations that
//! compose dispatch and polling.

mod completion;
mod operations;
mod poller;

pub use completion::{Condition, Expectation, expectation};
pub use operations::ResourceOperations;
pub use poller::{CompletionPoller, PollConfig};
