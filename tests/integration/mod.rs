//! Integration tests module for MedLit
//!
//! Shared helpers for tests that exercise the library through its public
//! API: a mock summarization backend and file-backed stores in temporary
//! directories.

pub mod persistence_test;
pub mod search_flow_test;

use medlit::api::{RetryPolicy, SummarizerClient};
use serde_json::{json, Value};
use std::sync::Once;
use std::time::Duration;
use wiremock::MockServer;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Client pointed at `server` with a 1 ms backoff step.
pub fn client_for(server: &MockServer) -> SummarizerClient {
    SummarizerClient::new(
        &format!("{}/api/summarize/search", server.uri()),
        Duration::from_secs(5),
        RetryPolicy::new(3, Duration::from_millis(1)),
    )
    .expect("valid mock server URL")
}

/// A backend response with `count` papers.
pub fn papers_response(count: usize, processing_time_seconds: f64) -> Value {
    let papers: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "paper_id": format!("{}", 40000000 + i),
                "title": format!("Paper {}", i + 1),
                "abstract": "Background and aims of the study.",
                "authors": ["Doe J", "Roe R"],
                "pub_date": "2024-05",
                "summary": {
                    "key_findings": ["Finding one", "Finding two", "Finding three", "Finding four", "Finding five"],
                    "methodology": "Randomized controlled trial",
                    "conclusion": "Intervention improved outcomes"
                },
                "confidence_score": 0.8
            })
        })
        .collect();

    json!({
        "success": true,
        "query": "q",
        "timestamp": "2024-05-01T10:00:00",
        "papers": papers,
        "total_processed": count,
        "processing_time_seconds": processing_time_seconds
    })
}
