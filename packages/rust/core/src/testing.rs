//! Test doubles for the external toolchain.

use std::cell::RefCell;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use docbuild_shared::Result;

use crate::runner::{CommandRunner, Invocation, ToolOutput};

type Predicate = Box<dyn Fn(&Invocation) -> bool>;

/// Records every invocation and imitates `pdflatex`, `bibtex` and `pandoc`.
///
/// - `pdflatex` writes `<stem>.aux`, `<stem>.log` and `<stem>.pdf` into its
///   `-output-directory`. The aux file gets a `\citation{...}` line when the
///   source contains `\cite`.
/// - `pandoc` writes the file named after `-o`.
/// - `bibtex` writes nothing.
pub(crate) struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    fail: Option<Predicate>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: None,
        }
    }

    /// Make matching invocations exit with code 1 and produce nothing.
    pub(crate) fn fail_when(mut self, predicate: impl Fn(&Invocation) -> bool + 'static) -> Self {
        self.fail = Some(Box::new(predicate));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .count()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.fail.as_ref().is_some_and(|f| f(invocation)) {
            return Ok(ToolOutput {
                exit_code: Some(1),
                stdout: format!("{} was told to fail\n", invocation.program),
                stderr: String::new(),
            });
        }

        let args = invocation.args_lossy();
        match invocation.program.as_str() {
            "pdflatex" => fake_latex(&args),
            "pandoc" => fake_pandoc(&args),
            _ => {}
        }

        Ok(ToolOutput {
            exit_code: Some(0),
            ..ToolOutput::default()
        })
    }
}

fn fake_latex(args: &[String]) {
    let out_dir = args
        .iter()
        .find_map(|a| a.strip_prefix("-output-directory="))
        .map(PathBuf::from)
        .expect("latex invoked without -output-directory");
    let source = PathBuf::from(args.last().expect("latex invoked without a source"));
    let stem = source.file_stem().unwrap().to_string_lossy().into_owned();

    let text = std::fs::read_to_string(&source).unwrap_or_default();
    let aux = if text.contains("\\cite") {
        "\\relax\n\\citation{knuth1984}\n\\bibstyle{plain}\n"
    } else {
        "\\relax\n\\gdef \\@abspage@last{1}\n"
    };

    std::fs::write(out_dir.join(format!("{stem}.aux")), aux).unwrap();
    std::fs::write(out_dir.join(format!("{stem}.log")), "This is pdfTeX\n").unwrap();
    std::fs::write(out_dir.join(format!("{stem}.pdf")), "%PDF-1.5\n").unwrap();
}

fn fake_pandoc(args: &[String]) {
    let pos = args
        .iter()
        .position(|a| a == "-o")
        .expect("pandoc invoked without -o");
    std::fs::write(&args[pos + 1], "%PDF-1.5\n").unwrap();
}

/// Unique directory under the system temp dir, removed again on drop.
pub(crate) struct TempDir(PathBuf);

impl TempDir {
    pub(crate) fn path(&self) -> &Path {
        &self.0
    }
}

impl Deref for TempDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

pub(crate) fn temp_dir(prefix: &str) -> TempDir {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    TempDir(dir)
}

pub(crate) fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}
