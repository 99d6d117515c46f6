//! **Project Software Bills of Materials into typed graph elements.**
//!
//! `sbom-graph` reads **CycloneDX** and **SPDX** JSON documents and turns each one into a
//! flat stream of graph nodes ready for loading into a graph database. Every node carries a
//! namespaced identifier, a bag of flattened attributes and the outgoing edges it owns.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The element stream itself. [`GraphElement`]s are one of four
//!   [`NodeKind`]s (`Document`, `Component`, `Vulnerability`, `Reference`), keyed by a
//!   [`NodeId`] such as `Component_pkg:npm/lodash@4.17.21`, with attributes flattened into
//!   dotted single-level keys.
//! - **[`projectors`]**: One [`Projector`] per format and the [`FormatDispatcher`] that picks
//!   between them by detection confidence.
//! - **[`pipeline`]**: Discovers documents on disk, projects them in parallel and writes the
//!   resulting records as JSON Lines or a JSON array.
//! - **[`config`]**: The [`AppConfig`] read from `.sbom-graph.yaml` and merged with CLI flags.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_graph::{project_file, NodeKind, MAX_SBOM_FILE_SIZE};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let elements = project_file(Path::new("path/to/bom.cdx.json"), MAX_SBOM_FILE_SIZE)?;
//!
//!     let components = elements
//!         .iter()
//!         .filter(|e| e.kind() == NodeKind::Component)
//!         .count();
//!     println!("{} elements, {} components", elements.len(), components);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Projecting an in-memory document
//!
//! ```
//! use sbom_graph::project_str;
//!
//! let elements = project_str(
//!     r#"{"bomFormat": "CycloneDX", "components": [{"bom-ref": "pkg:npm/a@1", "name": "a"}]}"#,
//! )
//! .unwrap();
//! assert_eq!(elements.len(), 2);
//! assert_eq!(elements[1].id().as_str(), "Component_pkg:npm/a@1");
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `sbom-graph` binary wraps the [`pipeline`] module: `sbom-graph project <paths>` writes
//! element records, `sbom-graph detect <paths>` reports what each document was recognized as.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod projectors;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use error::{ErrorContext, Result, SbomGraphError};
pub use model::{
    Attributes, EdgeName, EdgeRef, ElementSink, FlattenOptions, GraphElement, NodeId, NodeKind,
    RecordLayout,
};
pub use pipeline::{BatchReport, BatchRunner, OutputFormat};
pub use projectors::{
    detect_format, project_document, project_file, project_str, FormatDispatcher, ProjectError,
    Projector, SbomFormat, MAX_SBOM_FILE_SIZE,
};
