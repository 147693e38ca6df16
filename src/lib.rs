// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Aura Reconciler
//!
//! Blocking lifecycle operations for Neo4j Aura database instances and
//! customer-managed encryption keys.
//!
//! ## Overview
//!
//! The Aura API performs every state change asynchronously: a request only
//! enqueues the action, and the resource walks through intermediate statuses
//! before it settles. This crate gives callers synchronous semantics on top:
//!
//! - Submit an action and classify the answer (accepted, benign conflict, failure)
//! - Poll the resource until the action's terminal status is reached
//! - Retry connection-level timeouts, never application errors
//! - Bound every wait by a configurable attempt ceiling and a cancellation token
//!
//! ## Architecture
//!
//! Components are layered, each calling only the one below:
//!
//! 1. **Transport**: one HTTP request, timeout retries
//! 2. **Decoder**: JSON with normalized numbers and a single error message
//! 3. **Dispatcher**: action to verb and path, conflict classification
//! 4. **Poller**: warm-up, terminal-status table, settle delay, attempt ceiling
//! 5. **Operations**: create, delete, pause, resume, rename, resize, update flag
//!
//! ## Modules
//!
//! - [`config`]: Provider configuration parsing and validation
//! - [`aura`]: Transport, decoder, typed resources and action dispatch
//! - [`reconciler`]: Completion polling and resource operations
//! - [`logging`]: Subscriber setup
//! - [`error`]: Error taxonomy
//!
//! ## Example
//!
//! ```yaml
//! api:
//!   base_url: https://api.neo4j.io
//!   request_timeout_secs: 30
//! polling:
//!   interval_secs: 15
//!   timeout_minutes: 30
//! credentials:
//!   client_id: my-client
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod aura;
pub mod config;
pub mod error;
pub mod logging;
pub mod reconciler;

// ============================================================================
// Re-exports
// ============================================================================

pub use aura::{
    AccessToken, Action, AuraClient, CreateInstanceRequest, CreateKeyRequest, CustomerManagedKey,
    HttpTransport, Instance, InstanceFlag, InstanceUpdate, ResourceKind, ResourceStatus, Transport,
};
pub use config::{ConfigParser, ConfigValidator, Credentials, ProviderConfig};
pub use error::{AuraError, Result};
pub use logging::init_logging;
pub use reconciler::{CompletionPoller, PollConfig, ResourceOperations};
