//! Static HTML index of the built documents.
//!
//! Templates are plain HTML with three placeholders:
//! `{{title}}`, `{{date}}` and `{{documents}}`. The last one expands to one
//! `<li>` per artifact, linked by file name relative to the output directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use docbuild_shared::{DocBuildError, IndexConfig, Result};
use tracing::{debug, info, instrument};

const TITLE_PLACEHOLDER: &str = "{{title}}";
const DATE_PLACEHOLDER: &str = "{{date}}";
const DOCUMENTS_PLACEHOLDER: &str = "{{documents}}";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
body { font-family: sans-serif; max-width: 40em; margin: 2em auto; padding: 0 1em; }
li { margin: 0.3em 0; }
footer { color: #666; font-size: 0.9em; margin-top: 2em; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<ul>
{{documents}}
</ul>
<footer>Last built {{date}}</footer>
</body>
</html>
"#;

/// Render the index page for `artifacts`.
///
/// Uses `settings.template` when set (the file must contain
/// `{{documents}}`), else the built-in template.
pub fn render_index(artifacts: &[PathBuf], settings: &IndexConfig, date: NaiveDate) -> Result<String> {
    let template = match &settings.template {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).map_err(|e| DocBuildError::io(path, e))?;
            if !text.contains(DOCUMENTS_PLACEHOLDER) {
                return Err(DocBuildError::Render(format!(
                    "template {} has no {DOCUMENTS_PLACEHOLDER} placeholder",
                    path.display()
                )));
            }
            text
        }
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let mut stamp = String::new();
    write!(stamp, "{}", date.format(&settings.date_format)).map_err(|_| {
        DocBuildError::Render(format!("invalid date_format '{}'", settings.date_format))
    })?;

    let items = artifacts
        .iter()
        .map(|a| list_item(a))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(template
        .replace(TITLE_PLACEHOLDER, &html_escape(&settings.title))
        .replace(DATE_PLACEHOLDER, &html_escape(&stamp))
        .replace(DOCUMENTS_PLACEHOLDER, &items))
}

/// Render and write the index to `output_dir/<file_name>`; returns its path.
#[instrument(skip_all, fields(dir = %output_dir.display(), count = artifacts.len()))]
pub fn write_index(
    output_dir: &Path,
    artifacts: &[PathBuf],
    settings: &IndexConfig,
    date: NaiveDate,
) -> Result<PathBuf> {
    let html = render_index(artifacts, settings, date)?;

    let target = output_dir.join(&settings.file_name);
    let temp = output_dir.join(format!(".{}.tmp", settings.file_name));

    // Write to temp file first, then rename over the old index
    std::fs::write(&temp, html).map_err(|e| DocBuildError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| DocBuildError::io(&target, e))?;

    info!(path = %target.display(), "index written");
    Ok(target)
}

fn list_item(artifact: &Path) -> String {
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = artifact
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    debug!(name = %name, href = %file_name, "index entry");
    format!(
        "<li><a href=\"{}\">{}</a></li>",
        html_escape(&file_name),
        html_escape(&name)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
