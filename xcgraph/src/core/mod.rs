//! Pure graph logic for project documents.
//!
//! Core modules are free of I/O side effects. Filesystem facts arrive through
//! [`validation::FsProbe`] and [`files::FolderListing`] values built by
//! [`crate::io`], so every engine is testable against in-memory graphs.

pub mod classifier;
pub mod files;
pub mod graph;
pub mod groups;
pub mod invariants;
pub mod outline;
pub mod packages;
pub mod path;
pub mod sanitize;
pub mod settings;
pub mod targets;
pub mod types;
pub mod validation;
