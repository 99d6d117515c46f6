//! Pipeline orchestration for batch projection.
//!
//! This module provides the discover → project → write workflow shared by
//! the CLI command handlers.

mod batch;
mod output;
mod source;

pub use batch::{BatchReport, BatchRunner, DocumentOutcome};
pub use output::{write_elements, write_records, OutputFormat, OutputTarget};
pub use source::discover_documents;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - every document was projected
    pub const SUCCESS: i32 = 0;
    /// One or more documents failed or were not recognized
    pub const DOCUMENT_FAILURES: i32 = 1;
    /// A fatal error occurred (bad config, unreadable input, write failure)
    pub const ERROR: i32 = 2;
}
