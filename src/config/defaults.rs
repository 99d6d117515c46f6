//! Default values for sbom-graph configuration.

use super::types::{BehaviorConfig, ProjectionConfig, SourceConfig};
use crate::model::{RecordLayout, DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR};

/// Default extension of discovered documents.
pub const DEFAULT_EXTENSION: &str = "json";

/// Default document size limit in MB.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 512;

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            key_separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            layout: RecordLayout::Nested,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            recursive: true,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            parallel: true,
            quiet: false,
        }
    }
}
