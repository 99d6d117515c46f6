//! Projector trait definitions and error types.
//!
//! This module defines the `Projector` trait implemented by the
//! format-specific projectors and the confidence scoring the dispatcher uses
//! to pick one of them.

use crate::model::{GraphElement, NodeKind};
use serde_json::Value;
use thiserror::Error;

/// Errors that end the projection of a single document.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Document is {size_mb} MB, exceeding the {limit_mb} MB limit")]
    TooLarge { size_mb: u64, limit_mb: u64 },

    #[error("Unrecognized SBOM format: {0}")]
    UnknownFormat(String),

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),

    #[error("{kind} {context} does not contain a {field}")]
    MissingNaturalKey {
        kind: NodeKind,
        field: &'static str,
        context: String,
    },
}

impl ProjectError {
    /// Whether the error was raised because no projector recognized the document.
    #[must_use]
    pub const fn is_unknown_format(&self) -> bool {
        matches!(self, Self::UnknownFormat(_))
    }
}

impl From<std::io::Error> for ProjectError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

/// The SBOM formats this crate can project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SbomFormat {
    CycloneDx,
    Spdx,
}

impl SbomFormat {
    /// Human-readable format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CycloneDx => "CycloneDX",
            Self::Spdx => "SPDX",
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Confidence level for format detection
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FormatConfidence(f32);

impl FormatConfidence {
    /// No confidence - definitely not this format
    pub const NONE: Self = Self(0.0);
    /// Low confidence - a stray marker, not enough to project
    pub const LOW: Self = Self(0.25);
    /// Medium confidence - looks like this format but lacks its discriminator
    pub const MEDIUM: Self = Self(0.5);
    /// Certain - the format's discriminator is present
    pub const CERTAIN: Self = Self(1.0);

    /// Create a new confidence value
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the confidence value
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }
}

impl Default for FormatConfidence {
    fn default() -> Self {
        Self::NONE
    }
}

/// Detection result from a projector
#[derive(Debug, Clone)]
pub struct FormatDetection {
    /// Confidence that this projector can handle the document
    pub confidence: FormatConfidence,
    /// Detected specification version, if present
    pub version: Option<String>,
    /// Hints about why the document did or did not match
    pub warnings: Vec<String>,
}

impl FormatDetection {
    /// Create a detection result indicating no match
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            confidence: FormatConfidence::NONE,
            version: None,
            warnings: Vec::new(),
        }
    }

    /// Create a detection result with confidence
    #[must_use]
    pub const fn with_confidence(confidence: FormatConfidence) -> Self {
        Self {
            confidence,
            version: None,
            warnings: Vec::new(),
        }
    }

    /// Set the detected version
    #[must_use]
    pub fn version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }

    /// Add a warning
    #[must_use]
    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// A format-specific transformation from a decoded document to graph elements.
///
/// Implementations stage their output in a private
/// [`ElementSink`](crate::model::ElementSink) and only hand it back when the
/// whole document projected successfully.
pub trait Projector {
    /// The format this projector handles.
    fn format(&self) -> SbomFormat;

    /// Inspect the top-level keys of a document and report how likely it is
    /// to be in this projector's format.
    fn detect(&self, document: &Value) -> FormatDetection;

    /// Project a document into its graph elements.
    fn project(&self, document: &Value) -> Result<Vec<GraphElement>, ProjectError>;

    /// Get format name
    fn format_name(&self) -> &'static str {
        self.format().name()
    }
}
