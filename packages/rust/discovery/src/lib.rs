//! Source discovery: find the documents a build should compile.
//!
//! Sources are found by listing a single directory (no recursion) and keeping
//! the regular files whose name ends with a tracked extension. Discovery runs
//! fresh on every build; nothing is cached.

use std::path::Path;

use docbuild_shared::{DocBuildError, Result, SourceFile};
use tracing::{debug, info, instrument};

/// List the sources in `dir` whose file name ends with `extension`.
///
/// The match is an exact suffix check (`.tex` does not match `.TEX` or
/// `.texi`), and the stem is the file name with that suffix removed once.
/// A file named exactly like the extension has an empty stem and is skipped.
/// Results are sorted by stem rather than left in directory listing order,
/// which differs between filesystems.
///
/// A missing directory is not an error: it is logged and yields no sources.
#[instrument(skip_all, fields(dir = %dir.display(), extension = %extension))]
pub fn scan_sources(dir: &Path, extension: &str) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        info!("source directory not found, skipping");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| DocBuildError::io(dir, e))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DocBuildError::io(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| DocBuildError::io(entry.path(), e))?;

        // Symlinks count when they point at a file.
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(String::from) else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };

        match name.strip_suffix(extension) {
            Some(stem) if !stem.is_empty() => {
                sources.push(SourceFile::new(dir, stem, extension));
            }
            _ => {}
        }
    }

    sources.sort_by(|a, b| a.stem.cmp(&b.stem));
    debug!(count = sources.len(), "sources discovered");

    Ok(sources)
}
