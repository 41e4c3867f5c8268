pub mod qna;

use async_trait::async_trait;

use crate::models::KnowledgeAnswer;

#[async_trait]
pub trait KnowledgeProvider: Send + Sync {
    /// Candidate answers, best first. Empty when nothing qualifies.
    async fn query(&self, utterance: &str) -> anyhow::Result<Vec<KnowledgeAnswer>>;
}
