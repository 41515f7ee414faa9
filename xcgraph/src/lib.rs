//! Project-description graph engine.
//!
//! A project document is a graph of groups, file references, build steps,
//! joins, targets and configurations. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure graph logic (organization, file membership, targets,
//!   settings, validation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting boundaries (document files, config, folder
//!   scans, filesystem probes, save/transactions).
//!
//! [`session::ProjectSession`] ties the two together for CLI commands.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
