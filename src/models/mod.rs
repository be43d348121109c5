//! Presentation-side data models.
//!
//! [`PaperView`] is what result lists, speech and export work with. When the
//! backend cannot be reached, [`fallback_papers`] supplies a static set of
//! example summaries so the user still sees representative output.

pub mod paper;

pub use paper::{PaperView, SUMMARY_FINDINGS};

use once_cell::sync::Lazy;

static FALLBACK_JSON: &str = include_str!("fallback_papers.json");

static FALLBACK_PAPERS: Lazy<Vec<PaperView>> = Lazy::new(|| {
    serde_json::from_str(FALLBACK_JSON).unwrap_or_else(|e| {
        log::error!("Bundled example papers are invalid: {}", e);
        Vec::new()
    })
});

/// Static example papers shown when a live search fails.
pub fn fallback_papers() -> Vec<PaperView> {
    FALLBACK_PAPERS.clone()
}
