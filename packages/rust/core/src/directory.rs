//! Compile every source of one kind found in a directory.

use std::path::{Path, PathBuf};

use docbuild_discovery::scan_sources;
use docbuild_shared::{BuildConfig, DocBuildError, Result, SourceFile, SourceKind};
use tracing::{info, instrument, warn};

use crate::latex::compile_latex;
use crate::markdown::compile_markdown;
use crate::pipeline::ProgressReporter;
use crate::runner::CommandRunner;

/// What a directory pass produced.
#[derive(Debug, Clone, Default)]
pub struct DirectoryOutcome {
    /// One PDF path per discovered source, in discovery order.
    ///
    /// With fail-fast disabled this includes sources that failed, whose PDF
    /// may not exist.
    pub artifacts: Vec<PathBuf>,
    /// Sources that failed to compile (only populated with fail-fast disabled).
    pub failed: Vec<PathBuf>,
}

impl DirectoryOutcome {
    pub fn extend(&mut self, other: DirectoryOutcome) {
        self.artifacts.extend(other.artifacts);
        self.failed.extend(other.failed);
    }
}

/// Compile all files in `dir` ending in `extension`.
///
/// With `fail_fast` the first failure is returned as
/// [`DocBuildError::Compile`] and nothing after it runs. Otherwise failures
/// are logged and the loop moves on. A missing directory compiles nothing.
#[instrument(skip_all, fields(dir = %dir.display(), extension = %extension))]
pub fn compile_directory(
    runner: &dyn CommandRunner,
    config: &BuildConfig,
    dir: &Path,
    extension: &str,
    progress: &dyn ProgressReporter,
) -> Result<DirectoryOutcome> {
    let sources = scan_sources(dir, extension)?;
    let target_dir = config.target_dir(dir);
    let total = sources.len();

    let mut outcome = DirectoryOutcome::default();

    for (i, source) in sources.iter().enumerate() {
        let source_path = source.path();
        let artifact = source.artifact_in(target_dir);

        info!(
            source = %source_path.display(),
            artifact = %artifact.display(),
            "compiling"
        );
        progress.compiling(&source_path, i + 1, total);

        if let Err(e) = compile_source(runner, config, source, target_dir) {
            if config.fail_fast {
                return Err(DocBuildError::compile(source_path, e));
            }
            warn!(source = %source_path.display(), error = %e, "could not compile, continuing");
            outcome.failed.push(source_path);
        }

        outcome.artifacts.push(artifact);
    }

    Ok(outcome)
}

fn compile_source(
    runner: &dyn CommandRunner,
    config: &BuildConfig,
    source: &SourceFile,
    target_dir: &Path,
) -> Result<()> {
    match source.kind() {
        Some(SourceKind::Latex) => compile_latex(runner, &config.tools, source, target_dir),
        Some(SourceKind::Markdown) => compile_markdown(runner, &config.tools, source, target_dir),
        None => Err(DocBuildError::UnsupportedExtension {
            extension: source.extension.clone(),
            path: source.path(),
        }),
    }
}
