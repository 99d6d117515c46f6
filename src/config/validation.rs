//! Configuration validation for sbom-graph.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, BehaviorConfig, OutputConfig, ProjectionConfig, SourceConfig};
use crate::error::{Result, SbomGraphError};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl AppConfig {
    /// Validate the whole configuration, folding every problem into one error.
    ///
    /// # Errors
    ///
    /// Returns [`SbomGraphError::Config`] listing each invalid field.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(SbomGraphError::config(messages.join("; ")))
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.projection.validate());
        errors.extend(self.source.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for ProjectionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ConfigError {
                field: "projection.key_separator".to_string(),
                message: "Separator must not be empty".to_string(),
            });
        }

        if self.max_depth == 0 {
            errors.push(ConfigError {
                field: "projection.max_depth".to_string(),
                message: "Max depth must be at least 1".to_string(),
            });
        }

        errors
    }
}

impl Validatable for SourceConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.extensions.is_empty() {
            errors.push(ConfigError {
                field: "source.extensions".to_string(),
                message: "At least one file extension is required".to_string(),
            });
        }
        if self.extensions.iter().any(|ext| ext.trim().is_empty()) {
            errors.push(ConfigError {
                field: "source.extensions".to_string(),
                message: "File extensions must not be empty".to_string(),
            });
        }

        if self.max_file_size_mb == 0 {
            errors.push(ConfigError {
                field: "source.max_file_size_mb".to_string(),
                message: "Max file size must be at least 1 MB".to_string(),
            });
        }

        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "output.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        // BehaviorConfig contains only boolean flags that don't need validation
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_ensure_valid_folds_errors() {
        assert!(AppConfig::default().ensure_valid().is_ok());

        let config = AppConfig::builder().key_separator("").max_depth(0).build();
        match config.ensure_valid() {
            Err(SbomGraphError::Config(msg)) => {
                assert!(msg.starts_with("projection.key_separator: "), "{msg}");
                assert!(msg.contains("; projection.max_depth: "), "{msg}");
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_projection_validation() {
        let config = ProjectionConfig {
            key_separator: String::new(),
            max_depth: 0,
            ..ProjectionConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "projection.key_separator");
        assert_eq!(errors[1].field, "projection.max_depth");
    }

    #[test]
    fn test_source_validation() {
        let config = SourceConfig {
            extensions: Vec::new(),
            recursive: true,
            max_file_size_mb: 0,
        };
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, ["source.extensions", "source.max_file_size_mb"]);
    }

    #[test]
    fn test_output_parent_must_exist() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent/dir/out.jsonl")),
            ..OutputConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("output.file:"));

        let relative = OutputConfig {
            file: Some(PathBuf::from("out.jsonl")),
            ..OutputConfig::default()
        };
        assert!(relative.is_valid());
    }
}
