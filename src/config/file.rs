//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use crate::model::RecordLayout;
use crate::pipeline::OutputFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[".sbom-graph.yaml", ".sbom-graph.yml", "sbom-graph.yaml"];

/// Directory name under the user config directory.
pub const CONFIG_DIR_NAME: &str = "sbom-graph";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-graph/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    if let Some(path) = cwd.as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(path) = cwd
        .as_deref()
        .and_then(find_git_root)
        .and_then(|root| find_config_in_dir(&root))
    {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join(CONFIG_DIR_NAME)))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up from `start`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

/// Settings given explicitly on the command line.
///
/// `None` and `false` mean the flag was not passed and the file value stays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub layout: Option<RecordLayout>,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub fail_fast: bool,
    pub no_parallel: bool,
    pub quiet: bool,
}

impl AppConfig {
    /// Apply command-line overrides on top of this config.
    ///
    /// Every flag that was passed wins, including one that names the
    /// default value.
    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(layout) = overrides.layout {
            self.projection.layout = layout;
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.output_file.is_some() {
            self.output.file.clone_from(&overrides.output_file);
        }

        if overrides.fail_fast {
            self.behavior.fail_fast = true;
        }
        if overrides.no_parallel {
            self.behavior.parallel = false;
        }
        if overrides.quiet {
            self.behavior.quiet = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &CliOverrides,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# sbom-graph configuration file
# ==============================
#
# Place it at:
#   - .sbom-graph.yaml in your project root
#   - ~/.config/sbom-graph/sbom-graph.yaml for global config
#
# CLI arguments always override file settings.

# Attribute flattening and record layout
projection:
  # Separator between flattened key segments (supplier.name, hashes.0.alg)
  key_separator: '.'
  # Nesting deeper than this is kept unflattened
  max_depth: 32
  # nested: attributes under an 'attributes' key; inline: merged into the record
  layout: nested

# Document discovery for directory inputs
source:
  extensions:
    - json
  recursive: true
  max_file_size_mb: 512

# Output configuration
output:
  # Format: jsonl, json
  format: jsonl
  # Output file path (omit for stdout)
  # file: elements.jsonl

# Behavior flags
behavior:
  # Stop at the first document that fails to project
  fail_fast: false
  # Project documents in parallel
  parallel: true
  # Suppress non-essential output
  quiet: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbom-graph.yaml");
        std::fs::write(&config_path, "projection:\n  key_separator: '_'\n").unwrap();

        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_find_git_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_git_root(&nested), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r"
projection:
  key_separator: '__'
  layout: inline
output:
  format: json
behavior:
  fail_fast: true
";
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.projection.key_separator, "__");
        assert_eq!(config.projection.max_depth, 32);
        assert_eq!(config.projection.layout, RecordLayout::Inline);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.behavior.fail_fast);
        assert!(config.behavior.parallel);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_load_config_file_invalid_yaml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("bad.yaml");
        std::fs::write(&config_path, "projection: [unclosed").unwrap();
        assert!(matches!(
            load_config_file(&config_path),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig::builder().key_separator("_").build();
        let overrides = CliOverrides {
            layout: Some(RecordLayout::Inline),
            fail_fast: true,
            no_parallel: true,
            ..CliOverrides::default()
        };

        base.merge(&overrides);

        assert_eq!(base.projection.key_separator, "_");
        assert_eq!(base.projection.layout, RecordLayout::Inline);
        assert!(base.behavior.fail_fast);
        assert!(!base.behavior.parallel);
    }

    #[test]
    fn test_cli_default_values_override_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbom-graph.yaml");
        std::fs::write(
            &config_path,
            "projection:\n  layout: inline\noutput:\n  format: json\n",
        )
        .unwrap();

        let overrides = CliOverrides {
            layout: Some(RecordLayout::Nested),
            format: Some(OutputFormat::Jsonl),
            ..CliOverrides::default()
        };
        let (config, loaded_from) =
            AppConfig::from_file_with_overrides(Some(&config_path), &overrides);

        assert_eq!(loaded_from, Some(config_path));
        assert_eq!(config.projection.layout, RecordLayout::Nested);
        assert_eq!(config.output.format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_unset_flags_keep_file_values() {
        let mut config = AppConfig::builder()
            .layout(RecordLayout::Inline)
            .fail_fast(true)
            .build();

        config.merge(&CliOverrides::default());

        assert_eq!(config.projection.layout, RecordLayout::Inline);
        assert!(config.behavior.fail_fast);
        assert!(config.behavior.parallel);
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let example = generate_example_config();
        let config: AppConfig = serde_yaml::from_str(&example).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "behavior:\n  quiet: true\n").unwrap();

        let discovered = discover_config_file(Some(&config_path));
        assert_eq!(discovered, Some(config_path));
    }
}
