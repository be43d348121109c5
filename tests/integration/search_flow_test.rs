//! Search workflow tests against a mock summarization backend.
//!
//! These tests drive `SearchSession` end to end: request shape, retry
//! behavior, history and audit recording, fallback, and export.

use super::{client_for, init_test_env, papers_response};
use medlit::audit::AuditEventType;
use medlit::history;
use medlit::models::fallback_papers;
use medlit::search::{SearchOutcome, SearchSession};
use medlit::settings::SummaryLength;
use medlit::storage::{FileStore, MemoryStore};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn memory_session(server: &MockServer) -> SearchSession {
    SearchSession::new(client_for(server), Arc::new(MemoryStore::new()), 5)
}

#[tokio::test]
async fn test_backend_recovers_after_two_failures() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize/search"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/summarize/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(papers_response(5, 20.0)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    let outcome = session.search("heart failure").await.unwrap();

    assert!(outcome.is_live());
    assert_eq!(outcome.papers().len(), 5);
    // Only the first four findings are shown
    assert_eq!(outcome.papers()[0].summary.len(), 4);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_persistent_backend_failure_shows_examples() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    let outcome = session.search("heart failure").await.unwrap();

    match &outcome {
        SearchOutcome::Fallback { papers, error } => {
            assert_eq!(papers.len(), fallback_papers().len());
            assert!(error.contains("503"));
        }
        SearchOutcome::Live { .. } => panic!("expected fallback outcome"),
    }
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    let outcome = session.search("heart failure").await.unwrap();
    assert!(!outcome.is_live());
}

#[tokio::test]
async fn test_repeated_searches_deduplicate_history() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(papers_response(2, 5.0)))
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    session.search("diabetes treatment").await.unwrap();
    session.search("asthma").await.unwrap();
    session.search("Diabetes  Treatment").await.unwrap();

    let entries = session.history().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].query, "diabetes treatment");
    assert_eq!(entries[1].query, "asthma");
    assert!(entries[0].timestamp >= entries[1].timestamp);

    let searches = session
        .audit()
        .events()
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::Search)
        .count();
    assert_eq!(searches, 3);
}

#[tokio::test]
async fn test_settings_are_sent_as_options() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "query": "copd exacerbation",
            "num_papers": 7,
            "length": "comprehensive",
            "temperature": 0.4
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(papers_response(1, 2.0)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    session.settings_mut().set_length(SummaryLength::Comprehensive);
    session.settings_mut().set_temperature(0.4);

    let outcome = session.search_with("copd exacerbation", 7).await.unwrap();
    assert!(outcome.is_live());
    assert_eq!(session.history().entries()[0].num_papers, 7);
}

#[tokio::test]
async fn test_search_then_export_all_results() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(papers_response(3, 30.0)))
        .mount(&server)
        .await;

    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(data.path()).unwrap());
    let mut session = SearchSession::new(client_for(&server), store, 3);

    let outcome = session.search("melanoma immunotherapy").await.unwrap();
    for paper in outcome.papers() {
        let path = session.export(paper, out.path()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    let exported = std::fs::read_dir(out.path()).unwrap().count();
    assert_eq!(exported, 3);

    let events = session.audit().events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].event_type, AuditEventType::Export);
    assert_eq!(events[3].event_type, AuditEventType::Search);
}

#[tokio::test]
async fn test_dashboard_stats_from_live_searches() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(papers_response(5, 90.0)))
        .mount(&server)
        .await;

    let mut session = memory_session(&server);
    session.search("sepsis antibiotics timing").await.unwrap();
    session.search("sepsis fluids").await.unwrap();

    let stats = history::compute_stats(session.history().entries());
    assert_eq!(stats.searches, 2);
    assert_eq!(stats.total_papers, 10);
    assert_eq!(stats.manual_minutes, 170);
    assert_eq!(stats.ai_minutes, 4);
    assert_eq!(stats.minutes_saved, 166);

    let terms = history::trending_terms(session.history().entries(), 6);
    assert_eq!(terms[0], "sepsis");
}
