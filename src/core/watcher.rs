use crate::core::diff::new_titles;
use crate::core::digest::{compose_digest, DEFAULT_SUBJECT};
use crate::domain::model::{Digest, FetchFailure, FetchOutcome, RunReport, RunStatus};
use crate::domain::ports::{Mailer, SnapshotStore, TitleSource};
use crate::utils::error::{Result, WatchError};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What to do when the page cannot be fetched or yields no titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// Log, send nothing and keep the previous snapshot.
    #[default]
    Skip,
    /// Fail the run with `WatchError::FetchFailed`.
    Abort,
}

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub subject: String,
    pub on_fetch_failure: FetchFailurePolicy,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            on_fetch_failure: FetchFailurePolicy::default(),
        }
    }
}

/// Result of the fetch/load/diff half of a run.
struct Comparison {
    current: Vec<String>,
    new_titles: Vec<String>,
    status: RunStatus,
    digest: Digest,
}

pub struct Watcher<S: TitleSource, St: SnapshotStore, M: Mailer> {
    source: S,
    store: St,
    mailer: M,
    settings: WatchSettings,
}

impl<S: TitleSource, St: SnapshotStore, M: Mailer> Watcher<S, St, M> {
    pub fn new(source: S, store: St, mailer: M, settings: WatchSettings) -> Self {
        Self {
            source,
            store,
            mailer,
            settings,
        }
    }

    /// One full run: fetch, diff against the snapshot, notify, persist.
    pub async fn run(&self) -> Result<RunReport> {
        let checked_at = Utc::now();
        tracing::info!("Checking {}", self.source.location());

        let comparison = match self.compare(checked_at).await? {
            Ok(comparison) => comparison,
            Err(failure) => {
                return Ok(RunReport::skipped(
                    self.source.location(),
                    checked_at,
                    &failure,
                ))
            }
        };

        let email_sent = match self.mailer.send(&comparison.digest).await {
            Ok(()) => {
                tracing::info!("Email sent successfully!");
                true
            }
            Err(e) => {
                tracing::error!("Error sending email: {}", e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                false
            }
        };

        self.store.save(&comparison.current).await?;
        tracing::debug!("Snapshot updated with {} titles", comparison.current.len());

        if comparison.status == RunStatus::Baseline && email_sent {
            tracing::info!("Initial email sent with all current thesis topics.");
        }

        Ok(RunReport {
            checked_at,
            source: self.source.location().to_string(),
            status: comparison.status,
            total_titles: comparison.current.len(),
            new_titles: comparison.new_titles,
            email_sent,
            snapshot_written: true,
            skip_reason: None,
        })
    }

    /// Same as `run` up to composing the digest; sends nothing and leaves the
    /// snapshot alone.
    pub async fn preview(&self) -> Result<(RunReport, Option<Digest>)> {
        let checked_at = Utc::now();
        tracing::info!("Previewing {}", self.source.location());

        match self.compare(checked_at).await? {
            Ok(comparison) => {
                let report = RunReport {
                    checked_at,
                    source: self.source.location().to_string(),
                    status: comparison.status,
                    total_titles: comparison.current.len(),
                    new_titles: comparison.new_titles,
                    email_sent: false,
                    snapshot_written: false,
                    skip_reason: None,
                };
                Ok((report, Some(comparison.digest)))
            }
            Err(failure) => Ok((
                RunReport::skipped(self.source.location(), checked_at, &failure),
                None,
            )),
        }
    }

    /// Outer error: the run must stop. Inner error: the fetch failed and the
    /// skip policy applies.
    async fn compare(
        &self,
        checked_at: chrono::DateTime<Utc>,
    ) -> Result<std::result::Result<Comparison, FetchFailure>> {
        let current = match self.source.fetch_titles().await {
            FetchOutcome::Titles(titles) => titles,
            FetchOutcome::Failed(failure) => {
                return match self.settings.on_fetch_failure {
                    FetchFailurePolicy::Skip => {
                        tracing::warn!(
                            "⚠️ Skipping run, fetching {} failed: {}",
                            self.source.location(),
                            failure
                        );
                        Ok(Err(failure))
                    }
                    FetchFailurePolicy::Abort => Err(WatchError::FetchFailed {
                        reason: failure.to_string(),
                    }),
                };
            }
        };
        tracing::info!("Fetched {} titles", current.len());

        let previous = self.store.load().await?;
        let (status, fresh) = match previous {
            Some(previous) if !previous.is_empty() => {
                let fresh = new_titles(&current, &previous);
                let status = if fresh.is_empty() {
                    RunStatus::Unchanged
                } else {
                    RunStatus::NewTitles
                };
                (status, fresh)
            }
            _ => {
                tracing::info!("No previous snapshot, treating current titles as baseline");
                (RunStatus::Baseline, Vec::new())
            }
        };

        for title in &fresh {
            tracing::info!("🆕 {}", title);
        }

        let digest = compose_digest(&current, &fresh, &self.settings.subject, checked_at)?;

        Ok(Ok(Comparison {
            current,
            new_titles: fresh,
            status,
            digest,
        }))
    }
}
