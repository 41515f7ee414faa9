//! Side-effecting boundaries: document files, tool config, filesystem probes
//! and folder scans, and the save/transaction controller.

pub mod config;
pub mod document;
pub mod folder;
pub mod fs_probe;
pub mod persistence;
