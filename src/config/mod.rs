//! Configuration module for sbom-graph.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_graph::config::AppConfig;
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .key_separator("_")
//!     .fail_fast(true)
//!     .build();
//!
//! // Load from file
//! use sbom_graph::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-graph.yaml` file in your project root or `~/.config/sbom-graph/`:
//!
//! ```yaml
//! projection:
//!   layout: inline
//! behavior:
//!   fail_fast: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{DEFAULT_EXTENSION, DEFAULT_MAX_FILE_SIZE_MB};
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, OutputConfig, ProjectionConfig, SourceConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    CliOverrides, ConfigFileError, CONFIG_DIR_NAME, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-graph.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
