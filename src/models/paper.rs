//! Display-ready paper model.
//!
//! This module defines the shape a search result takes once it leaves the
//! wire layer: flat strings suitable for listing, reading aloud and export.

use crate::api::Paper;
use crate::export::ExportPaper;
use serde::{Deserialize, Serialize};

/// Number of key findings shown per paper in result lists.
pub const SUMMARY_FINDINGS: usize = 4;

/// A summarized paper as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperView {
    /// PubMed identifier.
    pub pmid: String,

    pub title: String,

    /// Journal name. The summarization backend does not report it, so live
    /// results leave it empty.
    #[serde(default)]
    pub journal: String,

    /// Publication date as reported (free-form, e.g. `2024-03`).
    #[serde(default)]
    pub date: String,

    /// Authors joined with `", "`.
    #[serde(default)]
    pub authors: String,

    /// Up to [`SUMMARY_FINDINGS`] key findings.
    #[serde(default)]
    pub summary: Vec<String>,

    /// Methodology and conclusion separated by a blank line.
    #[serde(default)]
    pub full_summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,

    /// Original abstract, kept for the export fallback.
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

impl PaperView {
    /// Link to the paper's PubMed page.
    pub fn pubmed_url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}", self.pmid)
    }

    /// Metadata line: non-empty journal, date and PMID joined with ` • `.
    pub fn metadata_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.journal.is_empty() {
            parts.push(self.journal.clone());
        }
        if !self.date.is_empty() {
            parts.push(self.date.clone());
        }
        if !self.pmid.is_empty() {
            parts.push(format!("PMID: {}", self.pmid));
        }
        parts.join(" • ")
    }

    /// Text to read aloud: title, key findings and full summary.
    pub fn speech_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.title.is_empty() {
            parts.push(self.title.clone());
        }
        if !self.summary.is_empty() {
            parts.push(format!("Key Findings: {}", self.summary.join("; ")));
        }
        if !self.full_summary.is_empty() {
            parts.push(format!("Full Summary: {}", self.full_summary));
        }

        parts.join(". ")
    }

    /// Converts this view into the export input.
    ///
    /// When the structured methodology and conclusion are unknown the full
    /// summary stands in as the abstract.
    pub fn to_export_paper(&self) -> ExportPaper {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());

        let abstract_text = self
            .abstract_text
            .as_deref()
            .and_then(non_empty)
            .or_else(|| non_empty(&self.full_summary));

        ExportPaper {
            title: self.title.clone(),
            pmid: non_empty(&self.pmid),
            journal: non_empty(&self.journal),
            date: non_empty(&self.date),
            authors: non_empty(&self.authors),
            key_findings: self.summary.clone(),
            methodology: self.methodology.as_deref().and_then(non_empty),
            conclusion: self.conclusion.as_deref().and_then(non_empty),
            abstract_text,
        }
    }
}

impl From<&Paper> for PaperView {
    fn from(paper: &Paper) -> Self {
        let summary = &paper.summary;
        let full_summary = format!("{}\n\n{}", summary.methodology, summary.conclusion)
            .trim()
            .to_string();

        let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Self {
            pmid: paper.paper_id.clone(),
            title: paper.title.clone(),
            journal: String::new(),
            date: paper.pub_date.clone().unwrap_or_default(),
            authors: paper.authors.join(", "),
            summary: summary
                .key_findings
                .iter()
                .take(SUMMARY_FINDINGS)
                .cloned()
                .collect(),
            full_summary,
            methodology: optional(&summary.methodology),
            conclusion: optional(&summary.conclusion),
            abstract_text: paper.abstract_text.clone(),
        }
    }
}
