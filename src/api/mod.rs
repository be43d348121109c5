//! Client for the summarization backend.
//!
//! The backend does all retrieval and summarization; this module sends one
//! `POST` per search and retries transient failures with linear backoff.
//!
//! # Retry behavior
//!
//! - Up to `max_attempts` attempts (3 by default).
//! - After failed attempt `n`, wait `n * backoff_step` before the next one.
//! - Network errors, timeouts, 5xx, 408 and 429 are retried; other failures
//!   return immediately unless `retry_client_errors` is set.
//! - When every attempt fails, the last error is returned.

pub mod config;
pub mod error;
pub mod models;

pub use config::RetryPolicy;
pub use error::ApiError;
pub use models::{Paper, PaperSummary, SummarizeRequest, SummarizeResponse};

use crate::config::{get_config, MedlitConfig};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// HTTP client for `POST /api/summarize/search`.
#[derive(Debug, Clone)]
pub struct SummarizerClient {
    http: reqwest::Client,
    endpoint: url::Url,
    policy: RetryPolicy,
}

impl SummarizerClient {
    /// Creates a client for `endpoint` with a per-attempt `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `endpoint` is not an absolute URL,
    /// or `ApiError::Build` if the HTTP client cannot be constructed.
    pub fn new(endpoint: &str, timeout: Duration, policy: RetryPolicy) -> Result<Self, ApiError> {
        let endpoint = url::Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                endpoint.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            policy,
        })
    }

    /// Creates a client from application configuration.
    pub fn from_config(config: &MedlitConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.summarize_url(),
            config.timeout_duration(),
            RetryPolicy::from_config(config),
        )
    }

    /// Creates a client from the global configuration loaded by
    /// [`load_config`](crate::config::load_config).
    pub fn from_global_config() -> Result<Self, ApiError> {
        Self::from_config(&get_config())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Requests summaries for `query`.
    ///
    /// `options` are merged into the JSON body next to `query` and
    /// `num_papers`. Returns the first successful response; otherwise the
    /// error of the last attempt made.
    pub async fn fetch_summaries(
        &self,
        query: &str,
        num_papers: u32,
        options: &Map<String, Value>,
    ) -> Result<SummarizeResponse, ApiError> {
        let request = SummarizeRequest::new(query, num_papers, options);
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            match self.send_once(&request).await {
                Ok(response) => {
                    log::info!(
                        "Summaries for '{}' received on attempt {} in {:?} ({} papers)",
                        query,
                        attempt,
                        started.elapsed(),
                        response.papers.len()
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if !self.policy.should_retry(&err, attempt) {
                        log::warn!(
                            "Summarization request failed on attempt {}/{}: {}",
                            attempt,
                            self.policy.max_attempts,
                            err
                        );
                        return Err(err);
                    }

                    let delay = self.policy.delay_after(attempt);
                    log::debug!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        self.policy.max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(&self, request: &SummarizeRequest) -> Result<SummarizeResponse, ApiError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<SummarizeResponse>(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    fn client_for(server: &MockServer, policy: RetryPolicy) -> SummarizerClient {
        SummarizerClient::new(
            &format!("{}/api/summarize/search", server.uri()),
            Duration::from_secs(5),
            policy,
        )
        .unwrap()
    }

    fn success_body() -> Value {
        json!({
            "success": true,
            "query": "asthma",
            "papers": [{
                "paper_id": "1",
                "title": "Inhaled corticosteroids",
                "authors": ["Doe J"],
                "summary": {"key_findings": ["Fewer exacerbations"], "methodology": "", "conclusion": ""}
            }],
            "processing_time_seconds": 3.5
        })
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            SummarizerClient::new("not a url", Duration::from_secs(1), policy.clone()),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            SummarizerClient::new("ftp://host/x", Duration::from_secs(1), policy),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = MedlitConfig {
            api_base_url: "http://example.com:9000/".to_string(),
            ..Default::default()
        };
        let client = SummarizerClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://example.com:9000/api/summarize/search");
        assert_eq!(client.policy().max_attempts, 3);
    }

    #[test]
    #[serial]
    fn test_from_global_config() {
        crate::config::load_config(Some(json!({
            "medlit": {
                "apiBaseUrl": "http://summaries.internal:8080",
                "maxAttempts": 4,
                "backoffStepMs": 25
            }
        })))
        .unwrap();

        let client = SummarizerClient::from_global_config().unwrap();
        assert_eq!(client.endpoint(), "http://summaries.internal:8080/api/summarize/search");
        assert_eq!(client.policy().max_attempts, 4);
        assert_eq!(client.policy().backoff_step, Duration::from_millis(25));

        crate::config::reset_config();
        let client = SummarizerClient::from_global_config().unwrap();
        assert_eq!(client.policy().max_attempts, 3);
    }

    #[tokio::test]
    async fn test_sends_query_papers_and_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/summarize/search"))
            .and(body_partial_json(json!({
                "query": "asthma",
                "num_papers": 5,
                "model": "gpt-4"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut options = Map::new();
        options.insert("model".to_string(), json!("gpt-4"));

        let client = client_for(&server, fast_policy(3));
        let response = client.fetch_summaries("asthma", 5, &options).await.unwrap();
        assert_eq!(response.papers.len(), 1);
        assert_eq!(response.processing_time_seconds, Some(3.5));
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let response = client.fetch_summaries("asthma", 5, &Map::new()).await.unwrap();
        assert_eq!(response.papers[0].title, "Inhaled corticosteroids");
    }

    #[tokio::test]
    async fn test_always_failing_stops_after_three_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let err = client
            .fetch_summaries("asthma", 5, &Map::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Http {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let err = client.fetch_summaries("a", 5, &Map::new()).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_client_error_retried_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(3)
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            retry_client_errors: true,
            ..fast_policy(3)
        };
        let client = client_for(&server, policy);
        assert!(client.fetch_summaries("a", 5, &Map::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_last_error_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(504))
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let err = client.fetch_summaries("a", 5, &Map::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 504, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let err = client.fetch_summaries("a", 5, &Map::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried_as_network_error() {
        // Nothing listens on a port once its listener is dropped
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let policy = RetryPolicy::new(3, Duration::from_millis(40));
        let client = SummarizerClient::new(
            &format!("http://127.0.0.1:{}/api/summarize/search", port),
            Duration::from_secs(2),
            policy,
        )
        .unwrap();

        let started = Instant::now();
        let err = client.fetch_summaries("a", 5, &Map::new()).await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)), "unexpected error: {:?}", err);
        assert!(err.is_retryable());
        // Waits of 40 ms and 80 ms mean all three attempts were made
        assert!(started.elapsed() >= Duration::from_millis(120));
    }
}
