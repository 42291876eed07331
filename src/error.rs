use http::Method;

use std::fmt;

/// Represents errors that can occur when registering a path template.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InsertError {
    /// Attempted to store a different value for a template that is already
    /// registered. Templates differing only in variable names are the same
    /// template.
    Conflict {
        /// The existing template that the insertion is conflicting with.
        with: String,
    },
    /// An operation id was registered twice for different operations.
    DuplicateOperation {
        /// The operation id.
        id: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { with } => {
                write!(
                    f,
                    "insertion failed due to conflict with previously registered template: {}",
                    with
                )
            }
            Self::DuplicateOperation { id } => {
                write!(f, "operation id '{}' is already registered", id)
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// A failed match attempt.
///
/// ```
/// use path_registry::{MatchError, PathRegistry};
///
/// let mut registry = PathRegistry::new();
/// registry.insert("/pet/{petId}", "pet");
///
/// assert_eq!(registry.at("/store").unwrap_err(), MatchError::NotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MatchError {
    /// No matching template was found.
    NotFound,
    /// The path matches, but only for other request methods.
    MethodNotAllowed {
        /// The methods the path is registered for.
        allowed: Vec<Method>,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "matching template not found"),
            Self::MethodNotAllowed { allowed } => {
                write!(f, "method not allowed, expected one of:")?;
                for method in allowed {
                    write!(f, " {}", method)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MatchError {}
