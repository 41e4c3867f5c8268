use crate::models::{ChannelAccount, KnowledgeAnswer, Reply, UnderstandingResult, WELCOME_TEXT};
use crate::services::dispatch::handle_utterance;
use crate::services::knowledge::KnowledgeProvider;
use crate::services::scheduler::SchedulingBackend;
use crate::services::understanding::UnderstandingProvider;

/// Runs one message turn against the injected collaborators.
pub struct Dispatcher {
    understanding: Box<dyn UnderstandingProvider>,
    knowledge: Box<dyn KnowledgeProvider>,
    scheduler: Box<dyn SchedulingBackend>,
}

impl Dispatcher {
    pub fn new(
        understanding: Box<dyn UnderstandingProvider>,
        knowledge: Box<dyn KnowledgeProvider>,
        scheduler: Box<dyn SchedulingBackend>,
    ) -> Self {
        Self {
            understanding,
            knowledge,
            scheduler,
        }
    }

    pub async fn process_message(&self, utterance: &str) -> anyhow::Result<Reply> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Ok(Reply::help());
        }

        let turn_id = uuid::Uuid::new_v4();

        // Both lookups depend only on the utterance.
        let (understanding, answers) =
            tokio::join!(self.recognize(turn_id, utterance), self.query(turn_id, utterance));

        tracing::info!(
            %turn_id,
            top_intent = ?understanding.as_ref().and_then(|u| u.top_intent.as_deref()),
            answers = answers.len(),
            "processing message"
        );

        let reply = handle_utterance(understanding.as_ref(), &answers, self.scheduler.as_ref()).await?;

        tracing::info!(%turn_id, kind = reply.kind.as_str(), "reply chosen");

        Ok(reply)
    }

    async fn recognize(&self, turn_id: uuid::Uuid, utterance: &str) -> Option<UnderstandingResult> {
        match self.understanding.recognize(utterance).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%turn_id, error = %e, "understanding unavailable, falling back");
                None
            }
        }
    }

    async fn query(&self, turn_id: uuid::Uuid, utterance: &str) -> Vec<KnowledgeAnswer> {
        match self.knowledge.query(utterance).await {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!(%turn_id, error = %e, "knowledge base unavailable, treating as no answers");
                Vec::new()
            }
        }
    }
}

/// One welcome per newly joined member, skipping the bot itself.
pub fn welcome_replies(members_added: &[ChannelAccount], recipient_id: Option<&str>) -> Vec<String> {
    members_added
        .iter()
        .filter(|member| Some(member.id.as_str()) != recipient_id)
        .map(|_| WELCOME_TEXT.to_string())
        .collect()
}
