pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{FileSnapshotStore, HttpPageSource, SmtpMailer};
pub use config::WatchConfig;
pub use core::watcher::{FetchFailurePolicy, WatchSettings, Watcher};
pub use domain::model::{Digest, FetchFailure, FetchOutcome, RunReport, RunStatus};
pub use utils::error::{Result, WatchError};
