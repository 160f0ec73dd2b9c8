//! Shared status and result types for nuon.
//!
//! Every fallible operation in the workspace returns [`Result`], whose
//! error type [`Status`] pairs a failure category with a human-readable
//! message.

use std::fmt;

/// Result alias used across the nuon crates.
pub type Result<T> = std::result::Result<T, Status>;

/// Failure category of a [`Status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Generic failure.
    Fail,
    /// A file path did not resolve or could not be opened.
    FileNotFound,
    /// An allocation request could not be satisfied.
    OutOfMemory,
    /// The model violates a structural or wire-format invariant.
    InvalidModel,
    /// A parameter or shape fails validation.
    InvalidParam,
    /// A runtime fault outside the other categories.
    RuntimeError,
    /// The model uses a feature that is recognized but not supported.
    NotImplemented,
    /// A worker thread could not be created or joined.
    ThreadError,
}

impl StatusKind {
    /// The canonical upper-snake spelling used in rendered messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "FAIL",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::InvalidModel => "INVALID_MODEL",
            Self::InvalidParam => "INVALID_PARAM",
            Self::RuntimeError => "RUNTIME_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::ThreadError => "THREAD_ERROR",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn render(kind: StatusKind, message: &str) -> String {
    if message.is_empty() {
        kind.as_str().to_string()
    } else {
        format!("{}:{}", kind.as_str(), message)
    }
}

/// Error carried by every fallible nuon operation.
///
/// Renders as `"<KIND>:<message>"`, or just `"<KIND>"` when the message
/// is empty.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Status {
    #[error("{}", render(StatusKind::Fail, .0))]
    Fail(String),
    #[error("{}", render(StatusKind::FileNotFound, .0))]
    FileNotFound(String),
    #[error("{}", render(StatusKind::OutOfMemory, .0))]
    OutOfMemory(String),
    #[error("{}", render(StatusKind::InvalidModel, .0))]
    InvalidModel(String),
    #[error("{}", render(StatusKind::InvalidParam, .0))]
    InvalidParam(String),
    #[error("{}", render(StatusKind::RuntimeError, .0))]
    RuntimeError(String),
    #[error("{}", render(StatusKind::NotImplemented, .0))]
    NotImplemented(String),
    #[error("{}", render(StatusKind::ThreadError, .0))]
    ThreadError(String),
}

impl Status {
    /// Builds a status from a kind and message, e.g. to re-wrap an error
    /// with extra context while keeping its category.
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            StatusKind::Fail => Self::Fail(message),
            StatusKind::FileNotFound => Self::FileNotFound(message),
            StatusKind::OutOfMemory => Self::OutOfMemory(message),
            StatusKind::InvalidModel => Self::InvalidModel(message),
            StatusKind::InvalidParam => Self::InvalidParam(message),
            StatusKind::RuntimeError => Self::RuntimeError(message),
            StatusKind::NotImplemented => Self::NotImplemented(message),
            StatusKind::ThreadError => Self::ThreadError(message),
        }
    }

    /// The failure category of this status.
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Fail(_) => StatusKind::Fail,
            Self::FileNotFound(_) => StatusKind::FileNotFound,
            Self::OutOfMemory(_) => StatusKind::OutOfMemory,
            Self::InvalidModel(_) => StatusKind::InvalidModel,
            Self::InvalidParam(_) => StatusKind::InvalidParam,
            Self::RuntimeError(_) => StatusKind::RuntimeError,
            Self::NotImplemented(_) => StatusKind::NotImplemented,
            Self::ThreadError(_) => StatusKind::ThreadError,
        }
    }

    /// The human-readable message, possibly empty.
    pub fn message(&self) -> &str {
        match self {
            Self::Fail(m)
            | Self::FileNotFound(m)
            | Self::OutOfMemory(m)
            | Self::InvalidModel(m)
            | Self::InvalidParam(m)
            | Self::RuntimeError(m)
            | Self::NotImplemented(m)
            | Self::ThreadError(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_kind_and_message() {
        let status = Status::InvalidModel("no graph".into());
        assert_eq!(status.to_string(), "INVALID_MODEL:no graph");
    }

    #[test]
    fn renders_bare_kind_when_message_empty() {
        let status = Status::Fail(String::new());
        assert_eq!(status.to_string(), "FAIL");
    }

    #[test]
    fn kind_and_message_accessors() {
        let status = Status::NotImplemented("ir_version 3".into());
        assert_eq!(status.kind(), StatusKind::NotImplemented);
        assert_eq!(status.message(), "ir_version 3");
    }

    #[test]
    fn kind_spellings() {
        assert_eq!(StatusKind::Fail.as_str(), "FAIL");
        assert_eq!(StatusKind::FileNotFound.as_str(), "FILE_NOT_FOUND");
        assert_eq!(StatusKind::OutOfMemory.as_str(), "OUT_OF_MEMORY");
        assert_eq!(StatusKind::InvalidModel.as_str(), "INVALID_MODEL");
        assert_eq!(StatusKind::InvalidParam.as_str(), "INVALID_PARAM");
        assert_eq!(StatusKind::RuntimeError.as_str(), "RUNTIME_ERROR");
        assert_eq!(StatusKind::NotImplemented.as_str(), "NOT_IMPLEMENTED");
        assert_eq!(StatusKind::ThreadError.as_str(), "THREAD_ERROR");
    }

    #[test]
    fn statuses_compare_by_kind_and_message() {
        assert_eq!(
            Status::Fail("x".into()),
            Status::Fail("x".into()),
        );
        assert_ne!(
            Status::Fail("x".into()),
            Status::RuntimeError("x".into()),
        );
        assert_ne!(Status::Fail("x".into()), Status::Fail("y".into()));
    }

    #[test]
    fn new_builds_the_matching_variant() {
        let status = Status::new(StatusKind::OutOfMemory, "alloc failed");
        assert_eq!(status, Status::OutOfMemory("alloc failed".into()));
    }

    #[test]
    fn status_is_an_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&Status::Fail(String::new()));
    }
}
