pub mod diff;
pub mod digest;
pub mod watcher;

pub use crate::domain::model::{Digest, FetchFailure, FetchOutcome, RunReport, RunStatus};
pub use crate::domain::ports::{Mailer, SnapshotStore, TitleSource};
pub use crate::utils::error::Result;
