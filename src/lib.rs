//! MedLit: medical literature search and summarization client
//!
//! This crate is the client side of a literature-summarization service. It
//! sends search queries to a summarization backend, shows the summarized
//! papers, and keeps local search history, user settings and an audit log.
//! Summaries can be exported to PDF or read aloud through a platform speech
//! engine.
//!
//! # Architecture
//!
//! - **storage**: key-value persistence (`KeyValueStore`, file and memory backends)
//! - **config**: application configuration and its global accessor
//! - **api**: summarization client with retry and linear backoff
//! - **history**: de-duplicated, size-capped search history plus dashboard insights
//! - **settings**: user settings with per-field defaults
//! - **audit**: capped log of user actions
//! - **models**: display-ready paper model and bundled example papers
//! - **search**: the search workflow tying the above together
//! - **export**: PDF export of a summarized paper
//! - **speech**: text-to-speech playback controller
//! - **estimate**: time-saved estimate for a search
//!
//! # Search flow
//!
//! 1. The query is trimmed and validated (at least 2 characters)
//! 2. Settings are forwarded to the backend as request options
//! 3. The backend is called, retrying transient failures
//! 4. On success the papers are mapped for display and the search is
//!    recorded in history and the audit log
//! 5. On failure the bundled example papers are shown instead
//!
//! # Example
//!
//! ```no_run
//! use medlit::config::MedlitConfig;
//! use medlit::search::SearchSession;
//! use medlit::storage::FileStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MedlitConfig::default();
//! let store = Arc::new(FileStore::open_default()?);
//! let mut session = SearchSession::from_config(&config, store)?;
//!
//! let outcome = session.search("sglt2 inhibitors heart failure").await?;
//! for paper in outcome.papers() {
//!     println!("{} ({})", paper.title, paper.pmid);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod estimate;
pub mod export;
pub mod history;
pub mod models;
pub mod search;
pub mod settings;
pub mod speech;
pub mod storage;

pub use api::{ApiError, RetryPolicy, SummarizerClient};
pub use search::{SearchError, SearchOutcome, SearchSession};
