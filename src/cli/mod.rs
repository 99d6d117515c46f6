//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand
//! and returns the process exit code.

mod detect;
mod project;

pub use detect::{format_detection, run_detect};
pub use project::run_project;
