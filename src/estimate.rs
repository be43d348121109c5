//! Time-saved estimate for a summarized search.
//!
//! Compares the time a manual literature search would take (searching,
//! reading the abstract and taking notes for every paper) with the backend
//! processing time.

/// Minutes spent finding one paper by hand.
pub const MINUTES_SEARCHING_PER_PAPER: u32 = 2;

/// Minutes spent reading or skimming one abstract.
pub const MINUTES_READING_PER_PAPER: u32 = 10;

/// Minutes spent writing notes for one paper.
pub const MINUTES_NOTES_PER_PAPER: u32 = 5;

/// Total manual minutes per paper.
pub const MANUAL_MINUTES_PER_PAPER: u32 =
    MINUTES_SEARCHING_PER_PAPER + MINUTES_READING_PER_PAPER + MINUTES_NOTES_PER_PAPER;

/// Estimated minutes saved by one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSaved {
    pub papers: u32,
    pub manual_minutes: u32,
    pub ai_minutes: u32,
    pub saved_minutes: u32,
}

impl TimeSaved {
    /// Human-readable amount, e.g. `"< 1 minute"` or `"85 minutes"`.
    pub fn display(&self) -> String {
        match self.saved_minutes {
            0 => "< 1 minute".to_string(),
            1 => "1 minute".to_string(),
            n => format!("{} minutes", n),
        }
    }

    /// One-line explanation of the assumptions behind the estimate.
    pub fn explanation(&self) -> String {
        format!(
            "Compared to manual PubMed search + abstract reading + note-taking for {} {}. \
             Assumptions: {}m search + {}m reading + {}m notes per paper, minus run time.",
            self.papers,
            if self.papers == 1 { "paper" } else { "papers" },
            MINUTES_SEARCHING_PER_PAPER,
            MINUTES_READING_PER_PAPER,
            MINUTES_NOTES_PER_PAPER,
        )
    }
}

/// Rounds backend processing time up to whole minutes.
pub fn ai_minutes(processing_time_seconds: Option<f64>) -> u32 {
    let seconds = processing_time_seconds.unwrap_or(0.0);
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds / 60.0).ceil() as u32
}

/// Estimates the time saved for a search returning `papers` papers.
///
/// Returns `None` when no papers were returned.
pub fn estimate_time_saved(papers: u32, processing_time_seconds: Option<f64>) -> Option<TimeSaved> {
    if papers == 0 {
        return None;
    }

    let manual_minutes = papers.saturating_mul(MANUAL_MINUTES_PER_PAPER);
    let ai_minutes = ai_minutes(processing_time_seconds);

    Some(TimeSaved {
        papers,
        manual_minutes,
        ai_minutes,
        saved_minutes: manual_minutes.saturating_sub(ai_minutes),
    })
}
