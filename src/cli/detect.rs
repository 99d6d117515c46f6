//! Detect command handler.
//!
//! Implements the `detect` subcommand: report the format each document would
//! be projected as, without projecting it.

use crate::config::AppConfig;
use crate::pipeline::{discover_documents, exit_codes};
use crate::projectors::{read_document, DetectionResult, FormatDispatcher, ACCEPT_THRESHOLD};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Run the detect command, returning the process exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_detect(paths: Vec<PathBuf>, config: AppConfig) -> Result<i32> {
    let documents = discover_documents(&paths, &config.source)?;
    let dispatcher = FormatDispatcher::with_options(config.projection.flatten_options());
    let max_size = config.source.max_file_size_bytes();

    let mut exit_code = exit_codes::SUCCESS;
    for path in &documents {
        let line = match read_document(path, max_size) {
            Ok(document) => {
                let detection = dispatcher.detect(&document);
                if !detection.can_project(ACCEPT_THRESHOLD) {
                    exit_code = exit_codes::DOCUMENT_FAILURES;
                }
                format_detection(path, &detection)
            }
            Err(e) => {
                exit_code = exit_codes::DOCUMENT_FAILURES;
                format!("{}: error: {e}", path.display())
            }
        };
        println!("{line}");
    }

    Ok(exit_code)
}

/// Render one detection as a summary line followed by indented hints.
pub fn format_detection(path: &Path, detection: &DetectionResult) -> String {
    let mut out = match detection.format {
        Some(format) if detection.can_project(ACCEPT_THRESHOLD) => format!(
            "{}: {} {} ({:.0}% confidence)",
            path.display(),
            format,
            detection.version.as_deref().unwrap_or("(unknown version)"),
            detection.confidence.value() * 100.0
        ),
        _ => format!("{}: unrecognized", path.display()),
    };
    for warning in &detection.warnings {
        let _ = write!(out, "\n    {warning}");
    }
    out
}
