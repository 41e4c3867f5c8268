pub mod http;

use async_trait::async_trait;

/// The scheduling backend. Both calls return the text shown to the user.
#[async_trait]
pub trait SchedulingBackend: Send + Sync {
    async fn get_availability(&self) -> anyhow::Result<String>;
    async fn schedule_appointment(&self, time: &str) -> anyhow::Result<String>;
}
