//! Detects whether a LaTeX run needs a bibliography pass.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use docbuild_shared::{DocBuildError, Result};
use tracing::debug;

/// Marker LaTeX writes to the aux file for every `\cite`.
const CITATION_MARKER: &[u8] = b"\\citation{";

/// Check a LaTeX aux file for citation markers.
///
/// Lines are scanned as raw bytes, so aux files in any encoding work. Returns
/// on the first match. A missing aux file means there is nothing to cite.
pub fn uses_bibliography(aux_path: &Path) -> Result<bool> {
    let file = match File::open(aux_path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %aux_path.display(), "aux file not found, skipping bibliography");
            return Ok(false);
        }
        Err(e) => return Err(DocBuildError::io(aux_path, e)),
    };

    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|e| DocBuildError::io(aux_path, e))?;
        if contains(&line, CITATION_MARKER) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
