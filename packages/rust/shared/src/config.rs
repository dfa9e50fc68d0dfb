//! Build configuration for docbuild.
//!
//! Project config lives at `<root>/docbuild.toml` and is optional.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocBuildError, Result};

/// Default configuration file name, looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "docbuild.toml";

// ---------------------------------------------------------------------------
// Config structs (matching docbuild.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Build policy flags.
    #[serde(default)]
    pub build: BuildPolicyConfig,

    /// External tool names.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// HTML index settings.
    #[serde(default)]
    pub index: IndexConfig,
}

/// `[paths]` section. Relative paths resolve against the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `.tex` sources.
    #[serde(default = "default_tex_src")]
    pub tex_src: PathBuf,

    /// Directory holding `.md` sources.
    #[serde(default = "default_md_src")]
    pub md_src: PathBuf,

    /// Directory receiving the PDFs and the index.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tex_src: default_tex_src(),
            md_src: default_md_src(),
            output: default_output(),
        }
    }
}

fn default_tex_src() -> PathBuf {
    PathBuf::from("src").join("tex")
}
fn default_md_src() -> PathBuf {
    PathBuf::from("src").join("md")
}
fn default_output() -> PathBuf {
    PathBuf::from("documents")
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPolicyConfig {
    /// Abort the whole build on the first compile error.
    #[serde(default = "default_true")]
    pub fail_fast: bool,

    /// Remove every non-PDF file from the output directory after compiling.
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Compile next to the sources, then copy the PDFs into the output directory.
    #[serde(default = "default_true")]
    pub source_build: bool,

    /// Write an HTML index of the produced documents.
    #[serde(default = "default_true")]
    pub generate_index: bool,
}

impl Default for BuildPolicyConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            clean: true,
            source_build: true,
            generate_index: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[tools]` section — programs looked up on `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// LaTeX compiler.
    #[serde(default = "default_latex")]
    pub latex: String,

    /// Bibliography processor.
    #[serde(default = "default_bibtex")]
    pub bibtex: String,

    /// Markdown-to-PDF converter.
    #[serde(default = "default_pandoc")]
    pub pandoc: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            latex: default_latex(),
            bibtex: default_bibtex(),
            pandoc: default_pandoc(),
        }
    }
}

fn default_latex() -> String {
    "pdflatex".into()
}
fn default_bibtex() -> String {
    "bibtex".into()
}
fn default_pandoc() -> String {
    "pandoc".into()
}

/// `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// File name of the index inside the output directory.
    #[serde(default = "default_index_file")]
    pub file_name: String,

    /// Page title.
    #[serde(default = "default_index_title")]
    pub title: String,

    /// Custom HTML template; the built-in one is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// `chrono` format string for the date stamp.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            file_name: default_index_file(),
            title: default_index_title(),
            template: None,
            date_format: default_date_format(),
        }
    }
}

fn default_index_file() -> String {
    "index.html".into()
}
fn default_index_title() -> String {
    "Documents".into()
}
fn default_date_format() -> String {
    "%Y-%m-%d".into()
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Values given on the command line. `None`/`false` leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// LaTeX source directory, relative to the process working directory.
    pub tex_src: Option<PathBuf>,
    /// Markdown source directory, relative to the process working directory.
    pub md_src: Option<PathBuf>,
    pub keep_going: bool,
    pub no_clean: bool,
    pub no_source_build: bool,
    pub no_index: bool,
}

/// Runtime build configuration. Every path is absolute.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Repository root.
    pub root: PathBuf,
    /// LaTeX source directory.
    pub tex_dir: PathBuf,
    /// Markdown source directory.
    pub md_dir: PathBuf,
    /// Shared output directory.
    pub output_dir: PathBuf,
    pub fail_fast: bool,
    pub clean: bool,
    pub source_build: bool,
    pub generate_index: bool,
    pub tools: ToolsConfig,
    /// Index settings; `template` is already resolved against the root.
    pub index: IndexConfig,
}

impl BuildConfig {
    /// Merge the file config and CLI overrides into an absolute-path runtime config.
    pub fn resolve(root: &Path, config: &AppConfig, overrides: &CliOverrides) -> Result<Self> {
        let root = absolute(root)?;
        validate(config)?;

        let tex_dir = match &overrides.tex_src {
            Some(p) => absolute(p)?,
            None => root.join(&config.paths.tex_src),
        };
        let md_dir = match &overrides.md_src {
            Some(p) => absolute(p)?,
            None => root.join(&config.paths.md_src),
        };

        let mut index = config.index.clone();
        index.template = index.template.map(|t| root.join(t));

        Ok(Self {
            output_dir: root.join(&config.paths.output),
            tex_dir,
            md_dir,
            fail_fast: config.build.fail_fast && !overrides.keep_going,
            clean: config.build.clean && !overrides.no_clean,
            source_build: config.build.source_build && !overrides.no_source_build,
            generate_index: config.build.generate_index && !overrides.no_index,
            tools: config.tools.clone(),
            index,
            root,
        })
    }

    /// The merged settings in file form, with every path absolute.
    pub fn effective(&self) -> AppConfig {
        AppConfig {
            paths: PathsConfig {
                tex_src: self.tex_dir.clone(),
                md_src: self.md_dir.clone(),
                output: self.output_dir.clone(),
            },
            build: BuildPolicyConfig {
                fail_fast: self.fail_fast,
                clean: self.clean,
                source_build: self.source_build,
                generate_index: self.generate_index,
            },
            tools: self.tools.clone(),
            index: self.index.clone(),
        }
    }

    /// Where compiled PDFs land for sources in `source_dir`.
    pub fn target_dir<'a>(&'a self, source_dir: &'a Path) -> &'a Path {
        if self.source_build {
            source_dir
        } else {
            &self.output_dir
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| DocBuildError::io(path, e))
}

fn validate(config: &AppConfig) -> Result<()> {
    let tools = [
        ("tools.latex", &config.tools.latex),
        ("tools.bibtex", &config.tools.bibtex),
        ("tools.pandoc", &config.tools.pandoc),
    ];
    for (key, value) in tools {
        if value.trim().is_empty() {
            return Err(DocBuildError::config(format!("{key} must not be empty")));
        }
    }

    let file_name = &config.index.file_name;
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return Err(DocBuildError::config(format!(
            "index.file_name must be a plain file name, got '{file_name}'"
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load `<root>/docbuild.toml`. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = root.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBuildError::io(path, e))?;

    let config = toml::from_str(&content).map_err(|e| {
        DocBuildError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    tracing::debug!(?path, "loaded config file");

    Ok(config)
}
