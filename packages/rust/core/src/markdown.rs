//! Markdown compilation: a single converter run per file.

use std::path::Path;

use docbuild_shared::{Result, SourceFile, ToolsConfig};
use tracing::instrument;

use crate::runner::{CommandRunner, Invocation, run_tool};

/// Convert one `.md` source straight to `target_dir/<stem>.pdf`.
#[instrument(skip_all, fields(source = %source.path().display(), target = %target_dir.display()))]
pub fn compile_markdown(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    source: &SourceFile,
    target_dir: &Path,
) -> Result<()> {
    let invocation = Invocation::new(&tools.pandoc, &source.dir)
        .arg(source.path())
        .arg("-o")
        .arg(source.artifact_in(target_dir));

    run_tool(runner, &invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRunner, temp_dir, write};

    #[test]
    fn single_pandoc_invocation() {
        let dir = temp_dir("docbuild-md-test");
        let out = temp_dir("docbuild-md-out");
        write(&dir, "readme.md", "# Readme\n");
        let source = SourceFile::new(dir.path(), "readme", ".md");

        let runner = FakeRunner::new();
        compile_markdown(&runner, &ToolsConfig::default(), &source, &out).expect("compile");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "pandoc");
        assert_eq!(calls[0].working_dir, dir.path());
        assert_eq!(
            calls[0].args_lossy(),
            vec![
                dir.join("readme.md").display().to_string(),
                "-o".to_string(),
                out.join("readme.pdf").display().to_string(),
            ]
        );
        assert!(out.join("readme.pdf").exists());
    }

    #[test]
    fn converter_failure_is_reported() {
        let dir = temp_dir("docbuild-md-test");
        let source = SourceFile::new(dir.path(), "readme", ".md");

        let runner = FakeRunner::new().fail_when(|_| true);
        let err =
            compile_markdown(&runner, &ToolsConfig::default(), &source, &dir).unwrap_err();
        assert!(err.to_string().starts_with("command failed"));
        assert!(!dir.join("readme.pdf").exists());
    }
}
