//! CLI definition, tracing setup, and the build command.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use docbuild_core::pipeline::{BuildReport, ProgressReporter, run_build};
use docbuild_core::runner::SystemRunner;
use docbuild_shared::{AppConfig, BuildConfig, CliOverrides, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docbuild — compile all tex and markdown files and collect the PDFs.
#[derive(Parser)]
#[command(
    name = "docbuild",
    version,
    about = "Compiles all tex and markdown files of a repository and collects the PDFs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to your repository (defaults to the current directory).
    pub dir: Option<PathBuf>,

    /// Folder containing the tex sources.
    #[arg(long = "tex-src", value_name = "PATH")]
    pub tex_src: Option<PathBuf>,

    /// Folder containing the markdown sources.
    #[arg(long = "md-src", value_name = "PATH")]
    pub md_src: Option<PathBuf>,

    /// Config file to use instead of `<DIR>/docbuild.toml`.
    #[arg(long, value_name = "PATH", env = "DOCBUILD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep compiling after a document fails instead of aborting.
    #[arg(long)]
    pub keep_going: bool,

    /// Leave compiler by-products in the output directory.
    #[arg(long)]
    pub no_clean: bool,

    /// Compile straight into the output directory instead of next to the sources.
    #[arg(long)]
    pub no_source_build: bool,

    /// Skip writing the HTML index.
    #[arg(long)]
    pub no_index: bool,

    /// Print the resolved configuration as TOML and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            tex_src: self.tex_src.clone(),
            md_src: self.md_src.clone(),
            keep_going: self.keep_going,
            no_clean: self.no_clean,
            no_source_build: self.no_source_build,
            no_index: self.no_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Log lines go to stderr through `spinner`, which is hidden while each line
/// is written.
pub(crate) fn init_tracing(cli: &Cli, spinner: &ProgressBar) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbuild=info",
        1 => "docbuild=debug",
        _ => "docbuild=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(SpinnerWriter::new(spinner))
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(SpinnerWriter::new(spinner))
                .init();
        }
    }
}

/// Stderr writer that suspends the progress spinner around every write.
#[derive(Clone)]
struct SpinnerWriter {
    spinner: ProgressBar,
}

impl SpinnerWriter {
    fn new(spinner: &ProgressBar) -> Self {
        Self {
            spinner: spinner.clone(),
        }
    }
}

impl<'a> MakeWriter<'a> for SpinnerWriter {
    type Writer = SpinnerWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.spinner.suspend(|| std::io::stderr().write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}

// ---------------------------------------------------------------------------
// Build command
// ---------------------------------------------------------------------------

/// Run the CLI command. `spinner` is the bar the log writer suspends.
pub(crate) fn run(cli: Cli, spinner: ProgressBar) -> Result<()> {
    let root = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    if !root.is_dir() {
        return Err(eyre!("repository root '{}' is not a directory", root.display()));
    }

    let app_config = read_config(&root, cli.config.as_deref())?;
    let config = BuildConfig::resolve(&root, &app_config, &cli.overrides())?;

    if cli.show_config {
        println!("{}", render_config(&config)?);
        return Ok(());
    }

    info!(
        root = %config.root.display(),
        tex = %config.tex_dir.display(),
        md = %config.md_dir.display(),
        output = %config.output_dir.display(),
        "building documents"
    );

    let reporter = CliProgress::new(spinner);
    let report = run_build(&SystemRunner, &config, &reporter)?;

    print_summary(&report, &config);

    Ok(())
}

fn read_config(root: &Path, explicit: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("loading config {}", path.display()))?,
        None => load_config(root)?,
    };
    Ok(config)
}

/// The merged configuration as TOML, CLI overrides included.
fn render_config(config: &BuildConfig) -> Result<String> {
    Ok(toml::to_string_pretty(&config.effective())?)
}

fn print_summary(report: &BuildReport, config: &BuildConfig) {
    println!("{} documents created", report.artifacts.len());

    if !report.failed.is_empty() {
        println!("  Failed:  {}", report.failed.len());
        for source in &report.failed {
            println!("    {}", source.display());
        }
    }
    if config.clean {
        println!("  Removed: {}", report.removed);
    }
    if config.source_build {
        println!("  Copied:  {}", report.copied);
    }
    if let Some(index) = &report.index {
        println!("  Index:   {}", index.display());
    }
    println!("  Output:  {}", config.output_dir.display());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(spinner: ProgressBar) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn compiling(&self, source: &Path, current: usize, total: usize) {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.spinner
            .set_message(format!("Compiling [{current}/{total}] {name}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // An aborted build never reaches `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
