//! Format detection and dispatch.
//!
//! Every candidate projector scores a document; the first one (in registration
//! order) reaching the acceptance threshold projects it. Exactly one projector
//! runs per document.

use super::traits::{FormatConfidence, FormatDetection, ProjectError, Projector, SbomFormat};
use super::{CycloneDxProjector, SpdxProjector};
use crate::model::{FlattenOptions, GraphElement};
use serde_json::Value;

/// Minimum confidence for accepting a detection.
///
/// Only a format's discriminator (`bomFormat == "CycloneDX"`, `SPDXID`) scores
/// above this; partial hints are reported but never projected.
pub const ACCEPT_THRESHOLD: f32 = 0.75;

/// Result of format detection.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// The format that should handle this document, if detected.
    pub format: Option<SbomFormat>,
    /// Confidence level of the detection.
    pub confidence: FormatConfidence,
    /// Detected specification version if available.
    pub version: Option<String>,
    /// Hints collected from every projector.
    pub warnings: Vec<String>,
}

impl DetectionResult {
    /// Create a result indicating no format was detected.
    pub fn unknown(reason: &str) -> Self {
        Self {
            format: None,
            confidence: FormatConfidence::NONE,
            version: None,
            warnings: vec![reason.to_string()],
        }
    }

    fn detected(format: SbomFormat, detection: FormatDetection) -> Self {
        Self {
            format: Some(format),
            confidence: detection.confidence,
            version: detection.version,
            warnings: detection.warnings,
        }
    }

    /// Check if the detection is confident enough to project.
    pub fn can_project(&self, threshold: f32) -> bool {
        self.format.is_some() && self.confidence.value() >= threshold
    }
}

/// Chooses and runs the projector for a decoded document.
pub struct FormatDispatcher {
    projectors: Vec<Box<dyn Projector + Send + Sync>>,
    min_confidence: f32,
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormatDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formats: Vec<_> = self.projectors.iter().map(|p| p.format_name()).collect();
        f.debug_struct("FormatDispatcher")
            .field("projectors", &formats)
            .field("min_confidence", &self.min_confidence)
            .finish()
    }
}

impl FormatDispatcher {
    /// Create a dispatcher for CycloneDX and SPDX with default flattening.
    pub fn new() -> Self {
        Self::with_options(FlattenOptions::default())
    }

    /// Create a dispatcher for CycloneDX and SPDX with custom flattening.
    pub fn with_options(flatten: FlattenOptions) -> Self {
        Self::with_projectors(vec![
            Box::new(CycloneDxProjector::with_options(flatten.clone())),
            Box::new(SpdxProjector::with_options(flatten)),
        ])
    }

    /// Create a dispatcher over an explicit, ordered list of projectors.
    pub fn with_projectors(projectors: Vec<Box<dyn Projector + Send + Sync>>) -> Self {
        Self {
            projectors,
            min_confidence: ACCEPT_THRESHOLD,
        }
    }

    /// Override the acceptance threshold.
    #[must_use]
    pub fn with_threshold(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Score `document` against every projector without projecting it.
    pub fn detect(&self, document: &Value) -> DetectionResult {
        match self.select(document) {
            Ok((_, result)) | Err(result) => result,
        }
    }

    /// Detect the format of `document` and project it.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::UnknownFormat`] with the collected hints when no
    /// projector is confident enough, or the selected projector's error.
    pub fn dispatch(&self, document: &Value) -> Result<Vec<GraphElement>, ProjectError> {
        let (projector, detection) = self.select(document).map_err(|rejected| {
            ProjectError::UnknownFormat(rejected.warnings.join("; "))
        })?;

        for warning in &detection.warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!(
            "Projecting as {} {}",
            projector.format_name(),
            detection.version.as_deref().unwrap_or("(unknown version)")
        );
        projector.project(document)
    }

    fn select(
        &self,
        document: &Value,
    ) -> Result<(&(dyn Projector + Send + Sync), DetectionResult), DetectionResult> {
        if !document.is_object() {
            return Err(DetectionResult::unknown("Document root is not a JSON object"));
        }

        let mut hints = Vec::new();
        for projector in &self.projectors {
            let detection = projector.detect(document);
            let confidence = detection.confidence.value();
            tracing::debug!(
                "Format detection: {}={:.2}, threshold={:.2}",
                projector.format_name(),
                confidence,
                self.min_confidence
            );

            let result = DetectionResult::detected(projector.format(), detection);
            if result.can_project(self.min_confidence) {
                return Ok((&**projector, result));
            }

            if confidence > 0.0 {
                hints.push(format!(
                    "{} detection: {:.0}% confidence (threshold: {:.0}%)",
                    projector.format_name(),
                    confidence * 100.0,
                    self.min_confidence * 100.0
                ));
                hints.extend(result.warnings);
            }
        }

        let mut result = DetectionResult::unknown(
            "Document has neither bomFormat \"CycloneDX\" nor an SPDXID",
        );
        result.warnings.extend(hints);
        Err(result)
    }
}
