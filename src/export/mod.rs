//! Export of paper summaries to PDF.
//!
//! Export happens in two steps: [`layout`] places sanitized text on A4 pages
//! (wrapping, page breaks, running header and footer), then [`pdf`] encodes
//! the laid-out pages with the built-in Helvetica fonts.
//!
//! # Examples
//!
//! ```no_run
//! use medlit::export::{export_to_dir, ExportPaper};
//!
//! let paper = ExportPaper {
//!     title: "Efficacy of SGLT2 Inhibitors".to_string(),
//!     pmid: Some("38234567".to_string()),
//!     key_findings: vec!["HbA1c reduced by 0.8%".to_string()],
//!     ..Default::default()
//! };
//! let path = export_to_dir(&paper, std::path::Path::new("exports")).unwrap();
//! println!("wrote {}", path.display());
//! ```

pub mod layout;
pub mod pdf;

pub use layout::{ExportDocument, PageLayout, TextLine};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static NON_FILE_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// Input for one exported document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPaper {
    pub title: String,

    #[serde(default)]
    pub pmid: Option<String>,

    #[serde(default)]
    pub journal: Option<String>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub authors: Option<String>,

    #[serde(default)]
    pub key_findings: Vec<String>,

    #[serde(default)]
    pub methodology: Option<String>,

    #[serde(default)]
    pub conclusion: Option<String>,

    /// Rendered only when there are no findings, methodology or conclusion.
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Errors that can occur while exporting a document.
#[derive(Debug)]
pub enum ExportError {
    /// The PDF could not be assembled.
    Render(String),

    /// The file could not be written.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Render(msg) => write!(f, "Failed to render PDF: {}", msg),
            ExportError::Io(e) => write!(f, "Failed to write export: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Render(_) => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

/// Replaces control characters with spaces, collapses whitespace and trims.
pub fn sanitize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Lowercase ASCII slug: runs of anything but `a-z0-9` become one `-`.
pub fn slugify(text: &str) -> String {
    let lowered = sanitize(text).to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// `YYYYMMDD-HHMM` stamp used in file names.
pub fn file_stamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d-%H%M").to_string()
}

/// File name for an export: `<slug>_PMID-<pmid>_<stamp>.pdf`.
pub fn export_filename(paper: &ExportPaper, at: &DateTime<Local>) -> String {
    let mut slug = slugify(&paper.title);
    if slug.is_empty() {
        slug = "summary".to_string();
    }

    // Identifiers come from the backend; keep them to one path component
    let pmid = paper
        .pmid
        .as_deref()
        .map(|p| {
            NON_FILE_CHAR
                .replace_all(p.trim(), "-")
                .trim_matches(|c| c == '-' || c == '.')
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "NA".to_string());

    format!("{}_PMID-{}_{}.pdf", slug, pmid, file_stamp(at))
}

/// Lays out and renders `paper` to PDF bytes.
pub fn render_pdf(paper: &ExportPaper, at: &DateTime<Local>) -> Result<Vec<u8>, ExportError> {
    let generated_at = at.format("%Y-%m-%d %H:%M").to_string();
    let document = ExportDocument::layout(paper, &generated_at);
    pdf::render(&document)
}

/// Writes `paper` as a PDF into `dir` and returns the file path.
///
/// The directory is created if needed.
pub fn export_to_dir(paper: &ExportPaper, dir: &Path) -> Result<PathBuf, ExportError> {
    let now = Local::now();
    let bytes = render_pdf(paper, &now)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(paper, &now));
    fs::write(&path, bytes)?;

    log::info!("Exported '{}' to {}", paper.title, path.display());
    Ok(path)
}
