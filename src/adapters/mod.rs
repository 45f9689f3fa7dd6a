// Adapters layer: concrete implementations of the domain ports.

pub mod page_source;
pub mod smtp;
pub mod snapshot_file;

pub use page_source::HttpPageSource;
pub use smtp::SmtpMailer;
pub use snapshot_file::FileSnapshotStore;
