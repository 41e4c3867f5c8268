pub mod luis;

use async_trait::async_trait;

use crate::models::UnderstandingResult;

#[async_trait]
pub trait UnderstandingProvider: Send + Sync {
    /// `Ok(None)` means the service answered but produced nothing usable.
    async fn recognize(&self, utterance: &str) -> anyhow::Result<Option<UnderstandingResult>>;
}
