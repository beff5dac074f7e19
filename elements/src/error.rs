//! The error types shared by every container operation.

use std::sync::Arc;
use thiserror::Error;

/// A boxed error as returned by user constructors, factory methods and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A shared, cloneable error cause.
///
/// Failures of singleton elements are stored and handed out again on every
/// later request, so the underlying cause has to be shareable.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) fn into_cause(error: impl Into<BoxError>) -> Cause {
  Arc::from(error.into())
}

/// The error type for every container operation.
#[derive(Debug, Clone, Error)]
pub enum ElementError {
  #[error("No active element named '{name}'")]
  NotFoundByName { name: String },

  #[error("No active element of type {type_name}")]
  NotFoundByType { type_name: String },

  #[error("Type {type_name} is ambiguous, candidates: [{}]", .candidates.join(", "))]
  Ambiguous {
    type_name: String,
    candidates: Vec<String>,
  },

  #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
  CircularDependency { cycle: Vec<String> },

  #[error("Construction of element '{element}' failed: {cause}")]
  Construction {
    element: String,
    #[source]
    cause: Cause,
  },

  #[error("Post-initialization hook '{hook}' of element '{element}' failed: {cause}")]
  PostInit {
    element: String,
    hook: String,
    #[source]
    cause: Cause,
  },

  #[error("Duplicate element name '{name}'")]
  DuplicateName { name: String },

  #[error("Property '{property}' required by element '{element}' is not set")]
  PropertyNotFound { element: String, property: String },

  #[error("Property '{property}' required by element '{element}' is not a valid {target}: {cause}")]
  PropertyConversion {
    element: String,
    property: String,
    target: &'static str,
    #[source]
    cause: Cause,
  },

  #[error("Element '{element}' is a {actual}, not a {expected}")]
  TypeMismatch {
    element: String,
    expected: &'static str,
    actual: &'static str,
  },

  #[error("Invalid argument #{index} for element '{element}': {reason}")]
  InvalidArgument {
    element: String,
    index: usize,
    reason: String,
  },

  #[error("Element '{element}' has an unsatisfiable dependency: {cause}")]
  Unsatisfied {
    element: String,
    #[source]
    cause: Box<ElementError>,
  },

  #[error("Element '{element}' was supplied pre-built and cannot be constructed again")]
  AlreadyInitialized { element: String },

  #[error("{} structural problem(s) found: {}", .problems.len(), join_problems(.problems))]
  Validation { problems: Vec<ElementError> },
}

fn join_problems(problems: &[ElementError]) -> String {
  problems
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

impl ElementError {
  /// Returns `true` for both flavours of the not-found error.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      ElementError::NotFoundByName { .. } | ElementError::NotFoundByType { .. }
    )
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ElementError> = std::result::Result<T, E>;
