//! Error taxonomy for graph operations.
//!
//! Engines in [`crate::core`] return [`GraphError`] directly. The I/O layer
//! wraps it in `anyhow::Error` with context; [`error_kind`] recovers the kind
//! from such a chain for exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Coarse classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    NotRemovable,
    OperationFailed,
    TransactionState,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("configuration '{configuration}' not found on {owner}")]
    ConfigurationNotFound {
        configuration: String,
        owner: String,
    },

    #[error("{what} already exists: {name}")]
    AlreadyExists { what: &'static str, name: String },

    #[error("invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("dangerous value for {key}: {reason} (value '{value}')")]
    DangerousValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("dependency '{from}' -> '{to}' would create a cycle")]
    DependencyCycle { from: String, to: String },

    #[error("group '{0}' cannot be removed")]
    NotRemovable(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("no transaction in progress for {}", .0.display())]
    NoTransaction(PathBuf),

    #[error("transaction already in progress for {}", .0.display())]
    TransactionInProgress(PathBuf),
}

impl GraphError {
    pub fn invalid(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_)
            | Self::GroupNotFound(_)
            | Self::TargetNotFound(_)
            | Self::PackageNotFound(_)
            | Self::ConfigurationNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidArgument { .. }
            | Self::DangerousValue { .. }
            | Self::DependencyCycle { .. } => ErrorKind::InvalidArgument,
            Self::NotRemovable(_) => ErrorKind::NotRemovable,
            Self::OperationFailed(_) => ErrorKind::OperationFailed,
            Self::NoTransaction(_) | Self::TransactionInProgress(_) => ErrorKind::TransactionState,
        }
    }
}

/// Find the first [`GraphError`] in an error chain, defaulting to
/// `OperationFailed` for plain I/O or serialization failures.
pub fn error_kind(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<GraphError>()
        .or_else(|| {
            err.chain()
                .find_map(|cause| cause.downcast_ref::<GraphError>())
        })
        .map(GraphError::kind)
        .unwrap_or(ErrorKind::OperationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_names_offending_identifier() {
        let err = GraphError::TargetNotFound("App".to_string());
        assert_eq!(err.to_string(), "target not found: App");

        let err = GraphError::AlreadyExists {
            what: "package",
            name: "https://github.com/a/b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "package already exists: https://github.com/a/b"
        );
    }

    #[test]
    fn dangerous_value_is_an_invalid_argument() {
        let err = GraphError::DangerousValue {
            key: "OTHER_LDFLAGS".to_string(),
            value: "`id`".to_string(),
            reason: "backtick".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn error_kind_walks_context_chain() {
        let result: anyhow::Result<()> = Err(GraphError::NotRemovable("Products".to_string()))
            .context("remove group Products");
        let err = result.expect_err("error");
        assert_eq!(error_kind(&err), ErrorKind::NotRemovable);

        let plain = anyhow::anyhow!("disk full");
        assert_eq!(error_kind(&plain), ErrorKind::OperationFailed);
    }
}
