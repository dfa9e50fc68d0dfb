//! External tool execution.
//!
//! Tools are spawned directly from an argument vector (never through a shell),
//! so paths containing spaces or quotes need no escaping. Execution goes
//! through the [`CommandRunner`] trait so the compilers can be driven by a
//! fake in tests.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use docbuild_shared::{DocBuildError, Result};
use tracing::{debug, error};

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One external command: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path, resolved through `PATH`.
    pub program: String,
    /// Arguments, passed verbatim.
    pub args: Vec<OsString>,
    /// Directory the process starts in.
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments as lossy strings, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Renders a shell-like command line; only used for messages.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in self.args_lossy() {
            write!(f, " {}", quote(&arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let needs_quotes =
        word.is_empty() || word.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    if needs_quotes {
        format!("\"{}\"", word.replace('"', "\\\""))
    } else {
        word.to_string()
    }
}

// ---------------------------------------------------------------------------
// ToolOutput
// ---------------------------------------------------------------------------

/// Exit status and captured output of a finished tool.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// A run counts as successful only with exit code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Executes invocations and reports how they ended.
///
/// Implementations return `Ok` for any process that ran, whatever its exit
/// code; `Err` is reserved for processes that could not be started.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs tools as real child processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| DocBuildError::ToolLaunch {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a tool and turn a non-zero exit into [`DocBuildError::CompileFailure`].
///
/// On failure the captured stdout and stderr are logged first, one event per
/// non-blank line, then the failing command line and its exit code.
pub fn run_tool(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<()> {
    debug!(
        command = %invocation,
        cwd = %invocation.working_dir.display(),
        "running tool"
    );

    let output = runner.run(invocation)?;
    if output.success() {
        return Ok(());
    }

    for (stream, text) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            error!(program = %invocation.program, stream, "{line}");
        }
    }

    error!(
        command = %invocation,
        exit_code = ?output.exit_code,
        "error running tool"
    );

    Err(DocBuildError::CompileFailure {
        command: invocation.to_string(),
        exit_code: output.exit_code,
    })
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn display_quotes_awkward_arguments() {
        let inv = Invocation::new("pandoc", "/repo/src/md")
            .arg("/repo/my docs/readme.md")
            .arg("-o")
            .arg("out.pdf");
        assert_eq!(
            inv.to_string(),
            "pandoc \"/repo/my docs/readme.md\" -o out.pdf"
        );
    }

    #[test]
    fn success_requires_exit_code_zero() {
        let ok = ToolOutput {
            exit_code: Some(0),
            ..ToolOutput::default()
        };
        assert!(ok.success());

        let failed = ToolOutput {
            exit_code: Some(2),
            ..ToolOutput::default()
        };
        assert!(!failed.success());

        let killed = ToolOutput::default();
        assert!(!killed.success());
    }

    #[test]
    fn run_tool_maps_failure_to_compile_failure() {
        let runner = FakeRunner::new().fail_when(|inv| inv.program == "bibtex");
        let inv = Invocation::new("bibtex", "/repo/src/tex").arg("notes.aux");

        let err = run_tool(&runner, &inv).unwrap_err();
        match err {
            DocBuildError::CompileFailure { command, exit_code } => {
                assert_eq!(command, "bibtex notes.aux");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    /// Returns the same output for every invocation.
    struct CannedRunner(ToolOutput);

    impl CommandRunner for CannedRunner {
        fn run(&self, _invocation: &Invocation) -> Result<ToolOutput> {
            Ok(self.0.clone())
        }
    }

    #[traced_test]
    #[test]
    fn failure_logs_each_output_line_before_the_command() {
        let runner = CannedRunner(ToolOutput {
            exit_code: Some(1),
            stdout: "line one\nline two\n\nline three\n".into(),
            stderr: String::new(),
        });
        let inv = Invocation::new("pdflatex", "/repo/src/tex").arg("paper.tex");

        assert!(run_tool(&runner, &inv).is_err());

        assert!(logs_contain("line one"));
        assert!(logs_contain("line two"));
        assert!(logs_contain("line three"));
        assert!(!logs_contain("stream=\"stderr\""));

        logs_assert(|lines: &[&str]| {
            let is_output = |l: &&&str| l.contains("stream=\"stdout\"") && l.contains("line ");
            let count = lines.iter().filter(is_output).count();
            if count != 3 {
                return Err(format!("expected 3 output events, got {count}"));
            }
            let last_output = lines
                .iter()
                .rposition(|l| l.contains("line three"))
                .unwrap_or(0);
            let command = lines
                .iter()
                .position(|l| l.contains("error running tool") && l.contains("pdflatex paper.tex"));
            match command {
                Some(pos) if pos > last_output => Ok(()),
                Some(_) => Err("command logged before its output".into()),
                None => Err("failing command not logged".into()),
            }
        });
    }

    #[traced_test]
    #[test]
    fn success_logs_no_output() {
        let runner = CannedRunner(ToolOutput {
            exit_code: Some(0),
            stdout: "This is pdfTeX\n".into(),
            stderr: "warning\n".into(),
        });
        let inv = Invocation::new("pdflatex", "/repo/src/tex");

        run_tool(&runner, &inv).expect("success");
        assert!(!logs_contain("This is pdfTeX"));
        assert!(!logs_contain("error running tool"));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_output_and_exit_code() {
        let inv = Invocation::new("sh", std::env::temp_dir())
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");
        let output = SystemRunner.run(&inv).expect("spawn sh");
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_uses_working_dir() {
        let dir = std::env::temp_dir().canonicalize().unwrap();
        let inv = Invocation::new("sh", &dir).arg("-c").arg("pwd -P");
        let output = SystemRunner.run(&inv).expect("spawn sh");
        assert!(output.success());
        assert_eq!(output.stdout.trim(), dir.to_string_lossy());
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let inv = Invocation::new("docbuild-no-such-tool-xyz", std::env::temp_dir());
        let err = run_tool(&SystemRunner, &inv).unwrap_err();
        assert!(matches!(err, DocBuildError::ToolLaunch { .. }));
    }
}
