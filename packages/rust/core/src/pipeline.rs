//! End-to-end build: sources → PDFs → output directory → index.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use docbuild_artifacts::{cleanup, copy_artifacts, write_index};
use docbuild_shared::{BuildConfig, DocBuildError, Result, SourceKind};
use tracing::{info, instrument};

use crate::directory::compile_directory;
use crate::runner::CommandRunner;

/// Result of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    /// Every artifact path, LaTeX documents first, then Markdown.
    pub artifacts: Vec<PathBuf>,
    /// Sources that failed to compile (fail-fast disabled only).
    pub failed: Vec<PathBuf>,
    /// Files removed from the output directory by cleanup.
    pub removed: usize,
    /// Artifacts copied into the output directory.
    pub copied: usize,
    /// Path of the HTML index, if one was written.
    pub index: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each source is compiled.
    fn compiling(&self, source: &Path, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn compiling(&self, _source: &Path, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full build.
///
/// 1. Create the output directory (one level only)
/// 2. Compile the LaTeX directory, then the Markdown directory
/// 3. Clean non-PDF files out of the output directory
/// 4. Copy source-built PDFs into the output directory
/// 5. Write the HTML index
///
/// Steps 3–5 are each gated by their config flag. With fail-fast on, the
/// first compile error is returned and no later step runs.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn run_build(
    runner: &dyn CommandRunner,
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();

    ensure_output_dir(&config.output_dir)?;

    // --- Phase 1: Compile ---
    progress.phase("Compiling LaTeX sources");
    let mut outcome = compile_directory(
        runner,
        config,
        &config.tex_dir,
        SourceKind::Latex.extension(),
        progress,
    )?;

    progress.phase("Compiling Markdown sources");
    outcome.extend(compile_directory(
        runner,
        config,
        &config.md_dir,
        SourceKind::Markdown.extension(),
        progress,
    )?);

    let artifacts = outcome.artifacts;
    info!(
        count = artifacts.len(),
        failed = outcome.failed.len(),
        "{} documents created",
        artifacts.len()
    );

    // --- Phase 2: Cleanup ---
    let removed = if config.clean {
        progress.phase("Cleaning output directory");
        cleanup(&config.output_dir)?
    } else {
        0
    };

    // --- Phase 3: Copy ---
    let copied = if config.source_build {
        progress.phase("Copying documents");
        copy_artifacts(&artifacts, &config.output_dir)?
    } else {
        0
    };

    // --- Phase 4: Index ---
    let index = if config.generate_index && !artifacts.is_empty() {
        progress.phase("Writing index");
        let today = Local::now().date_naive();
        Some(write_index(
            &config.output_dir,
            &artifacts,
            &config.index,
            today,
        )?)
    } else {
        None
    };

    let report = BuildReport {
        artifacts,
        failed: outcome.failed,
        removed,
        copied,
        index,
        elapsed: start.elapsed(),
    };
    progress.done(&report);

    Ok(report)
}

/// Create the output directory if it is missing. Its parent must exist.
fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(DocBuildError::config(format!(
            "output path {} exists but is not a directory",
            dir.display()
        )));
    }

    std::fs::create_dir(dir).map_err(|e| DocBuildError::io(dir, e))?;
    info!(path = %dir.display(), "created output directory");
    Ok(())
}
