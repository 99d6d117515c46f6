//! Configuration types for sbom-graph operations.
//!
//! Provides structured configuration for projection, document discovery,
//! output and batch behavior.

use crate::model::{FlattenOptions, RecordLayout};
use crate::pipeline::OutputFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Attribute flattening and record layout
    pub projection: ProjectionConfig,
    /// Where documents are discovered
    pub source: SourceConfig,
    /// Output configuration (format, file)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the separator used between flattened key segments.
    pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.projection.key_separator = separator.into();
        self
    }

    /// Set the maximum nesting depth that is flattened.
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.config.projection.max_depth = depth;
        self
    }

    /// Set the record layout.
    pub const fn layout(mut self, layout: RecordLayout) -> Self {
        self.config.projection.layout = layout;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Stop the batch on the first failed document.
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.behavior.fail_fast = fail_fast;
        self
    }

    /// Project documents in parallel.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.behavior.parallel = parallel;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Attribute flattening and record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Separator placed between flattened key segments
    pub key_separator: String,
    /// Nesting deeper than this is kept unflattened
    #[schemars(range(min = 1))]
    pub max_depth: usize,
    /// Where attributes go in an output record
    pub layout: RecordLayout,
}

impl ProjectionConfig {
    /// Flattening options for the projectors.
    #[must_use]
    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            separator: self.key_separator.clone(),
            max_depth: self.max_depth,
        }
    }
}

/// Document discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceConfig {
    /// File extensions picked up when a directory is given
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Documents larger than this are rejected
    #[schemars(range(min = 1))]
    pub max_file_size_mb: u64,
}

impl SourceConfig {
    /// Size limit in bytes.
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Record encoding
    pub format: OutputFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Behavior flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Stop at the first document that fails to project
    pub fail_fast: bool,
    /// Project documents in parallel
    pub parallel: bool,
    /// Suppress non-essential output
    pub quiet: bool,
}
