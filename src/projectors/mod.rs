//! SBOM projectors.
//!
//! This module turns decoded CycloneDX and SPDX documents into graph
//! elements.
//!
//! ## Format Detection
//!
//! Each projector reports a confidence score (0.0-1.0) for a document. The
//! [`FormatDispatcher`] runs the first projector whose score reaches
//! [`ACCEPT_THRESHOLD`]; anything less is rejected with
//! [`ProjectError::UnknownFormat`] and the collected hints.
//!
//! ## Usage
//!
//! ```no_run
//! use sbom_graph::projectors::{detect_format, project_file, MAX_SBOM_FILE_SIZE};
//! use std::path::Path;
//!
//! let elements = project_file(Path::new("bom.json"), MAX_SBOM_FILE_SIZE).unwrap();
//! println!("{} elements", elements.len());
//!
//! let document: serde_json::Value =
//!     serde_json::from_str(r#"{"SPDXID": "SPDXRef-DOCUMENT"}"#).unwrap();
//! if let Some(detected) = detect_format(&document) {
//!     println!("Detected: {} ({})", detected.format_name, detected.confidence);
//! }
//! ```

mod cyclonedx;
mod detection;
mod spdx;
mod traits;

pub use cyclonedx::{CycloneDxProjector, CYCLONEDX_BOM_FORMAT};
pub use detection::{DetectionResult, FormatDispatcher, ACCEPT_THRESHOLD};
pub use spdx::{RelationshipType, SpdxProjector};
pub use traits::{FormatConfidence, FormatDetection, ProjectError, Projector, SbomFormat};

use crate::model::{Attributes, GraphElement};
use serde_json::{Map, Value};
use std::path::Path;

/// Result of format detection
#[derive(Debug, Clone)]
pub struct DetectedFormat {
    /// Name of the detected format
    pub format_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Detected version if available
    pub version: Option<String>,
    /// Any warnings about the detection
    pub warnings: Vec<String>,
}

/// Detect the SBOM format of a decoded document without projecting it
///
/// Returns None if no format could be detected with sufficient confidence.
pub fn detect_format(document: &Value) -> Option<DetectedFormat> {
    let result = FormatDispatcher::new().detect(document);

    if result.can_project(ACCEPT_THRESHOLD) {
        Some(DetectedFormat {
            format_name: result
                .format
                .map(|f| f.name().to_string())
                .unwrap_or_default(),
            confidence: result.confidence.value(),
            version: result.version,
            warnings: result.warnings,
        })
    } else {
        None
    }
}

/// Project a decoded document with the default dispatcher.
pub fn project_document(document: &Value) -> Result<Vec<GraphElement>, ProjectError> {
    FormatDispatcher::new().dispatch(document)
}

/// Decode a JSON string and project it.
pub fn project_str(content: &str) -> Result<Vec<GraphElement>, ProjectError> {
    let document: Value = serde_json::from_str(content)?;
    project_document(&document)
}

/// Default maximum SBOM file size (512 MB).
pub const MAX_SBOM_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Read a JSON document from disk and decode it.
///
/// Returns an error if the file exceeds `max_size` bytes to prevent OOM.
pub fn read_document(path: &Path, max_size: u64) -> Result<Value, ProjectError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > max_size {
        return Err(ProjectError::TooLarge {
            size_mb: metadata.len() / (1024 * 1024),
            limit_mb: max_size / (1024 * 1024),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read, decode and project one file with the default dispatcher.
pub fn project_file(path: &Path, max_size: u64) -> Result<Vec<GraphElement>, ProjectError> {
    let document = read_document(path, max_size)?;
    project_document(&document)
}

/// Build attributes from typed identity fields followed by a catch-all field map.
///
/// Identity fields are deserialized separately from the catch-all, so they
/// have to be put back for the node to carry them as attributes.
pub(crate) fn identity_attributes(
    identity: &[(&str, Option<&Value>)],
    fields: &Map<String, Value>,
) -> Attributes {
    let mut attributes = Attributes::with_capacity(identity.len() + fields.len());
    for (name, value) in identity {
        if let Some(value) = value {
            attributes.insert((*name).to_string(), (*value).clone());
        }
    }
    attributes.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    attributes
}

/// String content of a scalar schema field. Non-string values count as absent.
pub(crate) fn field_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}
