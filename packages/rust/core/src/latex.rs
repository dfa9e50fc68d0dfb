//! LaTeX compilation: the fixed multi-pass protocol.
//!
//! ```text
//! PASS1 ──► [BIBLIOGRAPHY] ──► PASS2 ──► PASS3 ──► done
//! ```
//!
//! The bibliography pass only runs when the aux file written by pass 1 holds
//! citation markers. Pass 2 picks up the bibliography, pass 3 settles
//! references whose page numbers moved. The pass count is fixed; convergence
//! is not checked. Any failing step aborts the sequence.

use std::path::{Path, PathBuf};

use docbuild_shared::{Result, SourceFile, ToolsConfig};
use tracing::{debug, instrument};

use crate::bibliography::uses_bibliography;
use crate::runner::{CommandRunner, Invocation, run_tool};

/// LaTeX passes run after the optional bibliography step.
const PASSES_AFTER_BIBLIOGRAPHY: usize = 2;

/// Compile one `.tex` source into `target_dir/<stem>.pdf`.
///
/// Every tool runs with the source directory as working directory. The LaTeX
/// compiler also gets the source directory as include directory so relative
/// `\input`s resolve when output goes elsewhere.
#[instrument(skip_all, fields(source = %source.path().display(), target = %target_dir.display()))]
pub fn compile_latex(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    source: &SourceFile,
    target_dir: &Path,
) -> Result<()> {
    let latex = latex_invocation(tools, source, target_dir);

    debug!(pass = 1, "running latex");
    run_tool(runner, &latex)?;

    let aux_path = target_dir.join(aux_name(source));
    if uses_bibliography(&aux_path)? {
        debug!(aux = %aux_path.display(), "citations found, running bibliography pass");
        run_tool(runner, &bibtex_invocation(tools, source, target_dir))?;
    }

    for pass in 0..PASSES_AFTER_BIBLIOGRAPHY {
        debug!(pass = pass + 2, "running latex");
        run_tool(runner, &latex)?;
    }

    Ok(())
}

fn latex_invocation(tools: &ToolsConfig, source: &SourceFile, target_dir: &Path) -> Invocation {
    let mut include_dir = std::ffi::OsString::from("-include-directory=");
    include_dir.push(&source.dir);
    let mut output_dir = std::ffi::OsString::from("-output-directory=");
    output_dir.push(target_dir);

    Invocation::new(&tools.latex, &source.dir)
        .arg("-interaction=nonstopmode")
        .arg(include_dir)
        .arg(output_dir)
        .arg(source.path())
}

/// The bibliography tool resolves the aux path against its working directory
/// (the source directory), so the bare file name only works when LaTeX wrote
/// its output there too.
fn bibtex_invocation(tools: &ToolsConfig, source: &SourceFile, target_dir: &Path) -> Invocation {
    let aux: PathBuf = if same_dir(&source.dir, target_dir) {
        PathBuf::from(aux_name(source))
    } else {
        target_dir.join(aux_name(source))
    };

    Invocation::new(&tools.bibtex, &source.dir).arg(aux)
}

fn aux_name(source: &SourceFile) -> String {
    format!("{}.aux", source.stem)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
