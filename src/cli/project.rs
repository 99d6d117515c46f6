//! Project command handler.
//!
//! Implements the `project` subcommand: discover documents, project them and
//! write the element records.

use crate::config::AppConfig;
use crate::model::NodeKind;
use crate::pipeline::{
    discover_documents, exit_codes, write_elements, BatchReport, BatchRunner, OutputTarget,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the project command, returning the process exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_project(paths: Vec<PathBuf>, config: AppConfig) -> Result<i32> {
    config.ensure_valid()?;

    let documents = discover_documents(&paths, &config.source)?;
    if documents.is_empty() {
        tracing::warn!("No documents found");
    }

    let report = match BatchRunner::from_config(&config).run(&documents) {
        Ok(report) => report,
        Err(err) if err.is_document_error() => {
            tracing::error!("Stopping at first failure: {}", err);
            return Ok(exit_codes::DOCUMENT_FAILURES);
        }
        Err(err) => return Err(err.into()),
    };

    let target = OutputTarget::from_option(config.output.file.clone());
    write_elements(
        report.elements(),
        &target,
        config.output.format,
        config.projection.layout,
        config.behavior.quiet,
    )
    .context("Failed to write element records")?;

    if !config.behavior.quiet {
        log_summary(&report);
    }

    Ok(report.exit_code())
}

fn log_summary(report: &BatchReport) {
    tracing::info!(
        "Projected {}/{} documents into {} elements ({} documents, {} components, {} vulnerabilities, {} references)",
        report.succeeded(),
        report.documents(),
        report.element_count(),
        report.count_of(NodeKind::Document),
        report.count_of(NodeKind::Component),
        report.count_of(NodeKind::Vulnerability),
        report.count_of(NodeKind::Reference),
    );
    if report.failed() > 0 {
        tracing::warn!(
            "{} documents failed ({} not recognized as SBOMs)",
            report.failed(),
            report.unrecognized()
        );
    }
}
