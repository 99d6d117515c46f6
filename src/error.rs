//! Unified error types for sbom-graph.
//!
//! [`ProjectError`] describes why a single document could not be projected.
//! [`SbomGraphError`] wraps it together with the I/O, configuration and
//! output failures of the surrounding pipeline. [`ErrorContext`] prepends
//! context, such as the document path, as an error travels up.

use crate::projectors::ProjectError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-graph operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomGraphError {
    /// A document could not be projected
    #[error("Failed to project SBOM: {context}")]
    Project {
        context: String,
        #[source]
        source: ProjectError,
    },

    /// Errors while writing element records
    #[error("Failed to write output: {context}")]
    Output {
        context: String,
        #[source]
        source: OutputErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific output error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OutputErrorKind {
    #[error("JSON serialization failed: {0}")]
    Serialization(String),

    #[error("Write failed: {0}")]
    Write(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-graph operations
pub type Result<T> = std::result::Result<T, SbomGraphError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomGraphError {
    /// Create a projection error with context
    pub fn project(context: impl Into<String>, source: ProjectError) -> Self {
        Self::Project {
            context: context.into(),
            source,
        }
    }

    /// Create an output error with context
    pub fn output(context: impl Into<String>, source: OutputErrorKind) -> Self {
        Self::Output {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error concerns a single document rather than the whole run.
    #[must_use]
    pub const fn is_document_error(&self) -> bool {
        matches!(self, Self::Project { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<ProjectError> for SbomGraphError {
    fn from(err: ProjectError) -> Self {
        Self::project("", err)
    }
}

impl From<std::io::Error> for SbomGraphError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomGraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::output(
            "JSON serialization",
            OutputErrorKind::Serialization(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// This trait provides methods to add context information to errors,
/// creating a chain of context that helps trace the source of problems.
///
/// # Example
///
/// ```ignore
/// use sbom_graph::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<Vec<GraphElement>> {
///     project_file(path, MAX_SBOM_FILE_SIZE)
///         .with_context(|| format!("projecting {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context,
    /// creating a chain that shows the path through the code.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomGraphError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomGraphError, new_ctx: &str) -> SbomGraphError {
    match err {
        SbomGraphError::Project {
            context: existing,
            source,
        } => SbomGraphError::Project {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomGraphError::Output {
            context: existing,
            source,
        } => SbomGraphError::Output {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomGraphError::Io {
            path,
            message,
            source,
        } => SbomGraphError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomGraphError::Config(msg) => SbomGraphError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
