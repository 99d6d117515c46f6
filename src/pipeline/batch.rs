//! Batch projection of many documents.
//!
//! Each document is read, decoded and projected independently; one document
//! failing never affects the others.

use super::exit_codes;
use crate::config::AppConfig;
use crate::error::{ErrorContext, Result};
use crate::model::{GraphElement, NodeKind};
use crate::projectors::{read_document, FormatDispatcher, ProjectError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Result of projecting one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Path the document was read from
    pub path: PathBuf,
    /// Elements in emission order, or the reason the document was rejected
    pub result: std::result::Result<Vec<GraphElement>, ProjectError>,
}

impl DocumentOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Elements of a successful projection; empty for a failed one.
    #[must_use]
    pub fn elements(&self) -> &[GraphElement] {
        self.result.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn error(&self) -> Option<&ProjectError> {
        self.result.as_ref().err()
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Number of documents attempted.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of documents that failed for any reason, unrecognized ones included.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.documents() - self.succeeded()
    }

    /// Number of documents no projector recognized.
    #[must_use]
    pub fn unrecognized(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.error().is_some_and(ProjectError::is_unknown_format))
            .count()
    }

    /// All elements of the successful documents, in input order.
    pub fn elements(&self) -> impl Iterator<Item = &GraphElement> {
        self.outcomes.iter().flat_map(DocumentOutcome::elements)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.elements().len()).sum()
    }

    /// Number of emitted elements of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.elements().filter(|e| e.kind() == kind).count()
    }

    /// Process exit code for this batch.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            exit_codes::SUCCESS
        } else {
            exit_codes::DOCUMENT_FAILURES
        }
    }
}

/// Projects a list of documents with shared settings.
#[derive(Debug)]
pub struct BatchRunner {
    dispatcher: FormatDispatcher,
    max_file_size: u64,
    parallel: bool,
    fail_fast: bool,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl BatchRunner {
    /// Create a runner from the projection, source and behavior settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            dispatcher: FormatDispatcher::with_options(config.projection.flatten_options()),
            max_file_size: config.source.max_file_size_bytes(),
            parallel: config.behavior.parallel,
            fail_fast: config.behavior.fail_fast,
        }
    }

    /// Project every path.
    ///
    /// # Errors
    ///
    /// Only with `fail_fast`: the first failed document, in input order,
    /// aborts the batch.
    pub fn run(&self, paths: &[PathBuf]) -> Result<BatchReport> {
        let mut outcomes = if self.parallel {
            paths
                .par_iter()
                .map(|path| self.project_one(path))
                .collect::<Vec<_>>()
        } else if self.fail_fast {
            let mut outcomes = Vec::with_capacity(paths.len());
            for path in paths {
                let outcome = self.project_one(path);
                let failed = !outcome.is_success();
                outcomes.push(outcome);
                if failed {
                    break;
                }
            }
            outcomes
        } else {
            paths.iter().map(|path| self.project_one(path)).collect()
        };

        if self.fail_fast {
            if let Some(index) = outcomes.iter().position(|o| !o.is_success()) {
                let outcome = outcomes.swap_remove(index);
                if let Err(err) = outcome.result {
                    return Err(err).with_context(|| outcome.path.display().to_string());
                }
            }
        }

        Ok(BatchReport { outcomes })
    }

    /// Read, decode and project one document.
    pub fn project_one(&self, path: &Path) -> DocumentOutcome {
        let result = read_document(path, self.max_file_size)
            .and_then(|document| self.dispatcher.dispatch(&document));

        match &result {
            Ok(elements) => tracing::info!(
                "Projected {}: {} elements",
                path.display(),
                elements.len()
            ),
            Err(e) if e.is_unknown_format() => tracing::warn!(
                "The file at path {} is not a valid SBOM: {}",
                path.display(),
                e
            ),
            Err(e) => tracing::warn!("Failed to project {}: {}", path.display(), e),
        }

        DocumentOutcome {
            path: path.to_path_buf(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SbomGraphError;
    use tempfile::TempDir;

    const CYCLONEDX: &str = r#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "serialNumber": "urn:uuid:batch",
        "components": [{"bom-ref": "c1", "name": "foo"}]
    }"#;
    const SPDX: &str = r#"{"SPDXID": "SPDXRef-DOCUMENT", "packages": [{"SPDXID": "SPDXRef-p1", "name": "p1"}]}"#;
    const NOT_SBOM: &str = r#"{"hello": "world"}"#;

    fn write_docs(docs: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let tmp = TempDir::new().unwrap();
        let paths = docs
            .iter()
            .map(|(name, content)| {
                let path = tmp.path().join(name);
                std::fs::write(&path, content).unwrap();
                path
            })
            .collect();
        (tmp, paths)
    }

    fn runner(parallel: bool, fail_fast: bool) -> BatchRunner {
        BatchRunner::from_config(
            &AppConfig::builder()
                .parallel(parallel)
                .fail_fast(fail_fast)
                .build(),
        )
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_failures() {
        let (_tmp, paths) = write_docs(&[
            ("a.json", CYCLONEDX),
            ("b.json", NOT_SBOM),
            ("c.json", "{broken"),
            ("d.json", SPDX),
        ]);

        for parallel in [true, false] {
            let report = runner(parallel, false).run(&paths).unwrap();
            assert_eq!(report.documents(), 4);
            assert_eq!(report.succeeded(), 2);
            assert_eq!(report.failed(), 2);
            assert_eq!(report.unrecognized(), 1);
            assert_eq!(report.exit_code(), exit_codes::DOCUMENT_FAILURES);

            let order: Vec<_> = report.outcomes.iter().map(|o| o.path.clone()).collect();
            assert_eq!(order, paths);

            assert_eq!(report.count_of(NodeKind::Document), 2);
            assert_eq!(report.count_of(NodeKind::Component), 2);
            assert_eq!(report.element_count(), 4);
            assert!(matches!(
                report.outcomes[2].error(),
                Some(ProjectError::JsonError(_))
            ));
        }
    }

    #[test]
    fn test_fail_fast_reports_first_failure() {
        let (_tmp, paths) = write_docs(&[
            ("a.json", CYCLONEDX),
            ("b.json", NOT_SBOM),
            ("c.json", "{broken"),
        ]);

        for parallel in [true, false] {
            let err = runner(parallel, true).run(&paths).unwrap_err();
            match err {
                SbomGraphError::Project { context, source } => {
                    assert!(context.ends_with("b.json"), "{context}");
                    assert!(source.is_unknown_format());
                }
                other => panic!("expected Project error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_all_success_exit_code() {
        let (_tmp, paths) = write_docs(&[("a.json", CYCLONEDX)]);
        let report = runner(true, true).run(&paths).unwrap();
        assert_eq!(report.exit_code(), exit_codes::SUCCESS);
        assert_eq!(report.outcomes[0].elements().len(), 2);
    }

    #[test]
    fn test_size_limit_applies_per_document() {
        let (_tmp, paths) = write_docs(&[("a.json", CYCLONEDX)]);
        let runner = BatchRunner {
            max_file_size: 10,
            ..BatchRunner::default()
        };
        let report = runner.run(&paths).unwrap();
        assert!(matches!(
            report.outcomes[0].error(),
            Some(ProjectError::TooLarge { .. })
        ));
    }
}
