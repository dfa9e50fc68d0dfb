//! docbuild CLI — compile a repository's documents into PDFs.
//!
//! Builds every LaTeX and Markdown source, gathers the PDFs in one output
//! directory, and writes an HTML index linking to them.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;
use indicatif::ProgressBar;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let spinner = ProgressBar::new_spinner();
    commands::init_tracing(&cli, &spinner);
    commands::run(cli, spinner)
}
