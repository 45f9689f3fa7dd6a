use crate::domain::model::{Digest, FetchOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TitleSource: Send + Sync {
    async fn fetch_titles(&self) -> FetchOutcome;

    /// Human readable location of the source, used in logs and reports.
    fn location(&self) -> &str;
}

pub trait SnapshotStore: Send + Sync {
    /// `None` means no snapshot has ever been written.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<Vec<String>>>> + Send;
    fn save(&self, titles: &[String]) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
}
