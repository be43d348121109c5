//! Search workflow: query, summarize, record.
//!
//! A [`SearchSession`] ties the summarization client to the local stores.
//! A successful search is recorded in history and the audit log; a failed
//! one degrades to the bundled example papers instead of an error screen.

use crate::api::{ApiError, SummarizerClient};
use crate::audit::{self, AuditEventType, AuditLog};
use crate::config::{MedlitConfig, MAX_NUM_PAPERS};
use crate::estimate::{estimate_time_saved, TimeSaved};
use crate::export::{self, ExportError};
use crate::history::SearchHistory;
use crate::models::{fallback_papers, PaperView};
use crate::settings::SettingsManager;
use crate::storage::KeyValueStore;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shortest query the backend accepts, after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Papers summarized by the backend.
    Live {
        papers: Vec<PaperView>,
        processing_time_seconds: Option<f64>,
        time_saved: Option<TimeSaved>,
    },

    /// The backend failed; example papers are shown instead.
    Fallback { papers: Vec<PaperView>, error: String },
}

impl SearchOutcome {
    pub fn papers(&self) -> &[PaperView] {
        match self {
            SearchOutcome::Live { papers, .. } | SearchOutcome::Fallback { papers, .. } => papers,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SearchOutcome::Live { .. })
    }
}

/// Reasons a search is refused before any request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The query is blank or shorter than [`MIN_QUERY_CHARS`].
    QueryTooShort,

    /// The paper count is outside `1..=10`.
    InvalidPaperCount(u32),

    /// No history entry has this id.
    UnknownHistoryEntry(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::QueryTooShort => write!(
                f,
                "Query must be at least {} characters long",
                MIN_QUERY_CHARS
            ),
            SearchError::InvalidPaperCount(n) => write!(
                f,
                "Number of papers must be between 1 and {}, got {}",
                MAX_NUM_PAPERS, n
            ),
            SearchError::UnknownHistoryEntry(id) => write!(f, "No history entry with id {}", id),
        }
    }
}

impl std::error::Error for SearchError {}

/// Client plus the local stores a search touches.
pub struct SearchSession {
    client: SummarizerClient,
    history: SearchHistory,
    settings: SettingsManager,
    audit: AuditLog,
    default_num_papers: u32,
}

impl SearchSession {
    /// Loads history and settings from `store`.
    pub fn new(client: SummarizerClient, store: Arc<dyn KeyValueStore>, default_num_papers: u32) -> Self {
        Self {
            client,
            history: SearchHistory::load(store.clone()),
            settings: SettingsManager::load(store.clone()),
            audit: AuditLog::new(store),
            default_num_papers: default_num_papers.clamp(1, MAX_NUM_PAPERS),
        }
    }

    pub fn from_config(config: &MedlitConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let client = SummarizerClient::from_config(config)?;
        Ok(Self::new(client, store, config.default_num_papers))
    }

    /// Builds a session from the global configuration.
    pub fn from_global_config(store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        Self::from_config(&crate::config::get_config(), store)
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsManager {
        &mut self.settings
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Searches with the configured default paper count.
    pub async fn search(&mut self, query: &str) -> Result<SearchOutcome, SearchError> {
        self.search_with(query, self.default_num_papers).await
    }

    /// Searches for `query`, asking the backend for `num_papers` papers.
    ///
    /// Backend failures are not errors here: they produce
    /// [`SearchOutcome::Fallback`].
    pub async fn search_with(&mut self, query: &str, num_papers: u32) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(SearchError::QueryTooShort);
        }
        if num_papers == 0 || num_papers > MAX_NUM_PAPERS {
            return Err(SearchError::InvalidPaperCount(num_papers));
        }

        let options = self.settings.get().request_options();
        log::info!("Searching '{}' for {} papers", query, num_papers);

        match self.client.fetch_summaries(query, num_papers, &options).await {
            Ok(response) => {
                let papers: Vec<PaperView> = response.papers.iter().map(PaperView::from).collect();
                let processing_time_seconds = response.processing_time_seconds;

                self.history.add(query, num_papers, processing_time_seconds);
                self.audit.log_event(
                    AuditEventType::Search,
                    Some(audit::payload([
                        ("query", json!(query)),
                        ("numPapers", json!(num_papers)),
                        ("results", json!(papers.len())),
                    ])),
                );

                Ok(SearchOutcome::Live {
                    time_saved: estimate_time_saved(papers.len() as u32, processing_time_seconds),
                    papers,
                    processing_time_seconds,
                })
            }
            Err(err) => {
                log::warn!("Search failed, showing example papers: {}", err);
                Ok(SearchOutcome::Fallback {
                    papers: fallback_papers(),
                    error: err.to_string(),
                })
            }
        }
    }

    /// Runs the search recorded in history entry `entry_id` again.
    pub async fn rerun(&mut self, entry_id: &str) -> Result<SearchOutcome, SearchError> {
        let restored = self
            .history
            .get(entry_id)
            .map(SearchHistory::restore)
            .ok_or_else(|| SearchError::UnknownHistoryEntry(entry_id.to_string()))?;

        self.search_with(&restored.query, restored.num_papers).await
    }

    /// Exports `paper` as a PDF into `dir` and records the export.
    pub fn export(&self, paper: &PaperView, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = export::export_to_dir(&paper.to_export_paper(), dir)?;

        self.audit.log_event(
            AuditEventType::Export,
            Some(audit::payload([
                ("pmid", json!(paper.pmid)),
                ("title", json!(paper.title)),
                ("file", json!(path.display().to_string())),
            ])),
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use crate::storage::MemoryStore;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> (Arc<MemoryStore>, SearchSession) {
        let client = SummarizerClient::new(
            &format!("{}/api/summarize/search", server.uri()),
            Duration::from_secs(5),
            RetryPolicy::new(3, Duration::from_millis(1)),
        )
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        (store.clone(), SearchSession::new(client, store, 5))
    }

    fn body() -> serde_json::Value {
        json!({
            "success": true,
            "papers": [
                {
                    "paper_id": "111",
                    "title": "First",
                    "authors": ["A", "B"],
                    "pub_date": "2024",
                    "summary": {"key_findings": ["f1"], "methodology": "m", "conclusion": "c"}
                },
                {"paper_id": "222", "title": "Second"}
            ],
            "processing_time_seconds": 65.0
        })
    }

    #[tokio::test]
    async fn test_live_search_records_history_and_audit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "query": "Diabetes  Treatment",
                "num_papers": 5,
                "model": "llama3.1",
                "hipaaMode": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let (_, mut session) = session_for(&server);
        let outcome = session.search("  Diabetes  Treatment ").await.unwrap();

        assert!(outcome.is_live());
        assert_eq!(outcome.papers().len(), 2);
        assert_eq!(outcome.papers()[0].authors, "A, B");
        assert_eq!(outcome.papers()[0].full_summary, "m\n\nc");

        if let SearchOutcome::Live { time_saved, .. } = &outcome {
            let saved = time_saved.as_ref().unwrap();
            assert_eq!(saved.manual_minutes, 34);
            assert_eq!(saved.ai_minutes, 2);
        }

        let history = session.history().entries();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "diabetes treatment");
        assert_eq!(history[0].num_papers, 5);
        assert_eq!(history[0].processing_time_seconds, Some(65.0));

        let events = session.audit().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AuditEventType::Search);
        let payload = events[0].payload.as_ref().unwrap();
        assert_eq!(payload["query"], "Diabetes  Treatment");
        assert_eq!(payload["numPapers"], 5);
        assert_eq!(payload["results"], 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_examples() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let (_, mut session) = session_for(&server);
        let outcome = session.search("asthma").await.unwrap();

        match outcome {
            SearchOutcome::Fallback { papers, error } => {
                assert_eq!(papers, fallback_papers());
                assert_eq!(error, "API Error: 500 Internal Server Error");
            }
            other => panic!("expected fallback, got {:?}", other),
        }

        assert!(session.history().is_empty());
        assert!(session.audit().events().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_short_query_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(0)
            .mount(&server)
            .await;

        let (_, mut session) = session_for(&server);
        assert_eq!(session.search(" a ").await, Err(SearchError::QueryTooShort));
        assert_eq!(
            session.search_with("asthma", 11).await,
            Err(SearchError::InvalidPaperCount(11))
        );
    }

    #[tokio::test]
    async fn test_settings_flow_into_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "gpt-4", "anonymizePHI": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let (_, mut session) = session_for(&server);
        session
            .settings_mut()
            .set_model(crate::settings::ModelChoice::Gpt4);
        session.settings_mut().set_anonymize_phi(false);

        assert!(session.search("asthma").await.unwrap().is_live());
    }

    #[tokio::test]
    async fn test_rerun_uses_entry_paper_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"query": "asthma", "num_papers": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(2)
            .mount(&server)
            .await;

        let (_, mut session) = session_for(&server);
        session.search_with("asthma", 3).await.unwrap();
        let id = session.history().entries()[0].id.clone();

        session.rerun(&id).await.unwrap();
        assert_eq!(session.history().len(), 1);

        assert_eq!(
            session.rerun("missing").await,
            Err(SearchError::UnknownHistoryEntry("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_export_logs_event() {
        let server = MockServer::start().await;
        let (_, session) = session_for(&server);
        let dir = TempDir::new().unwrap();

        let paper = fallback_papers().remove(0);
        let path = session.export(&paper, dir.path()).unwrap();
        assert!(path.exists());

        let events = session.audit().events();
        assert_eq!(events[0].event_type, AuditEventType::Export);
        assert_eq!(events[0].payload.as_ref().unwrap()["pmid"], "38234567");
    }
}
