//! Wire types of the summarization endpoint.
//!
//! Decoding is lenient: every field has a default and explicit `null`s are
//! treated as absent, so partial backend output still renders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/summarize/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeRequest {
    pub query: String,
    pub num_papers: u32,

    /// Extra options forwarded verbatim (model, temperature, ...).
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SummarizeRequest {
    /// Builds a request. Options named `query` or `num_papers` are dropped so
    /// they cannot shadow the explicit fields.
    pub fn new(query: &str, num_papers: u32, options: &Map<String, Value>) -> Self {
        let options = options
            .iter()
            .filter(|(key, _)| key.as_str() != "query" && key.as_str() != "num_papers")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            query: query.to_string(),
            num_papers,
            options,
        }
    }
}

/// Response of the summarization endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,

    /// ISO-8601 time the backend produced the response.
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub papers: Vec<Paper>,

    #[serde(default)]
    pub total_processed: Option<u32>,

    /// Overall backend processing time.
    #[serde(default)]
    pub processing_time_seconds: Option<f64>,
}

/// One summarized paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// PubMed identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub paper_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,

    #[serde(default)]
    pub pub_date: Option<String>,

    #[serde(default)]
    pub doi_link: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: PaperSummary,

    #[serde(default)]
    pub confidence_score: Option<f64>,
}

/// Structured AI summary of one paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_findings: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub methodology: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub conclusion: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
