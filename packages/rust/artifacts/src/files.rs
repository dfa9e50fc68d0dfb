//! Output directory housekeeping.

use std::path::{Path, PathBuf};

use docbuild_shared::{DocBuildError, PDF_EXTENSION, Result};
use tracing::{debug, info, instrument, warn};

/// Remove every file in `output_dir` whose name does not end in `.pdf`.
///
/// Only the top level is touched; subdirectories are left alone.
/// Returns the number of files removed.
#[instrument(skip_all, fields(dir = %output_dir.display()))]
pub fn cleanup(output_dir: &Path) -> Result<usize> {
    let entries =
        std::fs::read_dir(output_dir).map_err(|e| DocBuildError::io(output_dir, e))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| DocBuildError::io(output_dir, e))?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().ends_with(PDF_EXTENSION) {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| DocBuildError::io(&path, e))?;
        if file_type.is_dir() {
            debug!(path = %path.display(), "leaving directory in place");
            continue;
        }

        std::fs::remove_file(&path).map_err(|e| DocBuildError::io(&path, e))?;
        debug!(path = %path.display(), "removed");
        removed += 1;
    }

    info!(removed, "output directory cleaned");
    Ok(removed)
}

/// Copy each artifact into `output_dir` under its own file name, overwriting.
///
/// Artifacts that do not exist (sources that failed while fail-fast was off)
/// are skipped with a warning. Artifacts already in `output_dir` are left as
/// they are. Returns the number of files copied.
#[instrument(skip_all, fields(dir = %output_dir.display(), count = artifacts.len()))]
pub fn copy_artifacts(artifacts: &[PathBuf], output_dir: &Path) -> Result<usize> {
    let mut copied = 0;

    for artifact in artifacts {
        let Some(file_name) = artifact.file_name() else {
            warn!(path = %artifact.display(), "artifact has no file name, skipping");
            continue;
        };

        if !artifact.is_file() {
            warn!(path = %artifact.display(), "artifact missing, not copied");
            continue;
        }

        let target = output_dir.join(file_name);
        if is_same_file(artifact, &target) {
            continue;
        }

        std::fs::copy(artifact, &target).map_err(|e| DocBuildError::io(&target, e))?;
        debug!(from = %artifact.display(), to = %target.display(), "copied artifact");
        copied += 1;
    }

    info!(copied, "artifacts copied");
    Ok(copied)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
