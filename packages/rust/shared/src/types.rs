//! Core domain types for docbuild sources and artifacts.

use std::path::{Path, PathBuf};

/// Extension of every artifact docbuild produces.
pub const PDF_EXTENSION: &str = ".pdf";

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// The document formats docbuild knows how to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// LaTeX sources, compiled with the multi-pass protocol.
    Latex,
    /// Markdown sources, converted to PDF in a single pass.
    Markdown,
}

impl SourceKind {
    /// The tracked file extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Latex => ".tex",
            Self::Markdown => ".md",
        }
    }

    /// Map a tracked extension back to its kind. Exact match only.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".tex" => Some(Self::Latex),
            ".md" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latex => "latex",
            Self::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SourceFile
// ---------------------------------------------------------------------------

/// A document source discovered in a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Directory the source lives in.
    pub dir: PathBuf,
    /// File name with the tracked extension stripped (e.g. `paper`).
    pub stem: String,
    /// The tracked extension this file matched, including the leading dot.
    pub extension: String,
}

impl SourceFile {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    /// Full path of the source file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    /// File name including the extension.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.extension)
    }

    /// The compiler this source dispatches to, if any.
    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::from_extension(&self.extension)
    }

    /// Path of the PDF this source produces inside `target_dir`.
    pub fn artifact_in(&self, target_dir: &Path) -> PathBuf {
        target_dir.join(format!("{}{PDF_EXTENSION}", self.stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(SourceKind::from_extension(".tex"), Some(SourceKind::Latex));
        assert_eq!(SourceKind::from_extension(".md"), Some(SourceKind::Markdown));
        assert_eq!(SourceKind::from_extension("tex"), None);
        assert_eq!(SourceKind::from_extension(".markdown"), None);
        assert_eq!(SourceKind::Latex.extension(), ".tex");
    }

    #[test]
    fn source_file_paths() {
        let src = SourceFile::new("/repo/src/tex", "paper", ".tex");
        assert_eq!(src.path(), PathBuf::from("/repo/src/tex/paper.tex"));
        assert_eq!(src.kind(), Some(SourceKind::Latex));
        assert_eq!(
            src.artifact_in(Path::new("/repo/documents")),
            PathBuf::from("/repo/documents/paper.pdf")
        );
    }

    #[test]
    fn unknown_extension_has_no_kind() {
        let src = SourceFile::new("/repo/src/rst", "intro", ".rst");
        assert_eq!(src.kind(), None);
        assert_eq!(src.file_name(), "intro.rst");
    }
}
