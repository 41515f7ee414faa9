//! Stable exit codes for `xcgraph` commands.

use crate::error::{ErrorKind, error_kind};

/// Command succeeded.
pub const OK: i32 = 0;
/// I/O, serialization or save failure, or any error without a graph kind.
pub const OPERATION_FAILED: i32 = 1;
/// A named file, group, target, package or configuration does not exist.
pub const NOT_FOUND: i32 = 2;
/// Creating something whose name is already taken.
pub const ALREADY_EXISTS: i32 = 3;
/// Malformed path, version, URL or dangerous setting value.
pub const INVALID_ARGUMENT: i32 = 4;
/// Attempt to remove the main group or the products group.
pub const NOT_REMOVABLE: i32 = 5;
/// Transaction begin/commit/rollback misuse.
pub const TRANSACTION_STATE: i32 = 6;
/// `xcgraph validate` reported findings (without `--fix`).
pub const FINDINGS: i32 = 7;

pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => NOT_FOUND,
        ErrorKind::AlreadyExists => ALREADY_EXISTS,
        ErrorKind::InvalidArgument => INVALID_ARGUMENT,
        ErrorKind::NotRemovable => NOT_REMOVABLE,
        ErrorKind::OperationFailed => OPERATION_FAILED,
        ErrorKind::TransactionState => TRANSACTION_STATE,
    }
}

pub fn for_error(err: &anyhow::Error) -> i32 {
    for_kind(error_kind(err))
}
