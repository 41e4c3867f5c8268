pub mod bot_connector;

use async_trait::async_trait;

use crate::models::Activity;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Sends `text` into the conversation `incoming` arrived on.
    async fn send_reply(&self, incoming: &Activity, text: &str) -> anyhow::Result<()>;
}
