use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of one page fetch. Failures carry their reason so the caller can
/// decide between skipping the run and aborting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Titles(Vec<String>),
    Failed(FetchFailure),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("no elements matched selector '{selector}'")]
    NoMatches { selector: String },
}

/// Composed notification, ready for any mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub header: String,
    pub html_body: String,
    pub text_body: String,
    pub total_titles: usize,
    pub new_titles: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No usable snapshot existed; the current list became the baseline.
    Baseline,
    Unchanged,
    NewTitles,
    /// Fetch failed and the run was skipped without touching the snapshot.
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub checked_at: DateTime<Utc>,
    pub source: String,
    pub status: RunStatus,
    pub total_titles: usize,
    pub new_titles: Vec<String>,
    pub email_sent: bool,
    pub snapshot_written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl RunReport {
    pub fn skipped(source: &str, checked_at: DateTime<Utc>, reason: &FetchFailure) -> Self {
        Self {
            checked_at,
            source: source.to_string(),
            status: RunStatus::Skipped,
            total_titles: 0,
            new_titles: Vec::new(),
            email_sent: false,
            snapshot_written: false,
            skip_reason: Some(reason.to_string()),
        }
    }
}
