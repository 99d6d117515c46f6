//! Output handling for element records.
//!
//! Records are written as JSON Lines (one record per line) or as a pretty
//! JSON array, to stdout or a file.

use crate::error::{ErrorContext, OutputErrorKind, Result, SbomGraphError};
use crate::model::{GraphElement, RecordLayout};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Encoding of the record stream
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON record per line
    #[default]
    Jsonl,
    /// A single pretty-printed JSON array
    Json,
}

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }
}

/// Serialize `elements` to `writer`, returning the number of records written.
pub fn write_records<'a, W, I>(
    writer: W,
    elements: I,
    format: OutputFormat,
    layout: RecordLayout,
) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a GraphElement>,
{
    let mut writer = BufWriter::new(writer);
    let mut count = 0;

    match format {
        OutputFormat::Jsonl => {
            for element in elements {
                serde_json::to_writer(&mut writer, &element.to_record(layout))?;
                writer.write_all(b"\n").map_err(write_error)?;
                count += 1;
            }
        }
        OutputFormat::Json => {
            let records: Vec<Value> = elements
                .into_iter()
                .map(|e| Value::Object(e.to_record(layout)))
                .collect();
            count = records.len();
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writer.write_all(b"\n").map_err(write_error)?;
        }
    }

    writer.flush().map_err(write_error)?;
    Ok(count)
}

/// Write records to the target (stdout or file)
pub fn write_elements<'a, I>(
    elements: I,
    target: &OutputTarget,
    format: OutputFormat,
    layout: RecordLayout,
    quiet: bool,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a GraphElement>,
{
    match target {
        OutputTarget::Stdout => {
            let stdout = std::io::stdout();
            write_records(stdout.lock(), elements, format, layout)
        }
        OutputTarget::File(path) => {
            let file = std::fs::File::create(path).map_err(|e| SbomGraphError::io(path, e))?;
            let count = write_records(file, elements, format, layout)
                .with_context(|| format!("writing {}", path.display()))?;
            if !quiet {
                tracing::info!("{} records written to {:?}", count, path);
            }
            Ok(count)
        }
    }
}

fn write_error(err: std::io::Error) -> SbomGraphError {
    SbomGraphError::output("writing records", OutputErrorKind::Write(err.to_string()))
}
