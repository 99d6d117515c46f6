//! Document discovery.
//!
//! Turns the paths given on the command line into an ordered list of
//! documents to project.

use crate::config::SourceConfig;
use crate::error::{ErrorContext, Result, SbomGraphError};
use std::path::{Path, PathBuf};

/// Expand `paths` into the documents to project.
///
/// A file path yields itself whatever its extension. A directory yields every
/// file whose extension is listed in `config.extensions`, descending into
/// subdirectories when `config.recursive` is set, sorted by path. The order of
/// `paths` is kept.
///
/// # Errors
///
/// Returns an I/O error for a path that does not exist or a directory that
/// cannot be read.
pub fn discover_documents(paths: &[PathBuf], config: &SourceConfig) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_dir(path, config, &mut found)
                .with_context(|| format!("scanning {}", path.display()))?;
            found.sort();
            tracing::debug!("Found {} documents under {}", found.len(), path.display());
            documents.extend(found);
        } else {
            return Err(SbomGraphError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    }

    Ok(documents)
}

fn collect_dir(dir: &Path, config: &SourceConfig, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| SbomGraphError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| SbomGraphError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| SbomGraphError::io(&path, e))?;

        // Symlinked directories are not followed.
        if file_type.is_dir() {
            if config.recursive {
                collect_dir(&path, config, found)?;
            }
        } else if has_extension(&path, &config.extensions) && path.is_file() {
            found.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}
