//! Decides which capability answers an utterance.
//!
//! Given the understanding result and the knowledge-base candidates for one
//! message, exactly one [`Reply`] is produced and the scheduling backend is
//! called at most once. Actionable intents are tried in
//! [`Intent::DISPATCH_ORDER`]; only the recognizer's top intent is ever
//! eligible, so at most one of them can match.

use crate::models::{
    Intent, KnowledgeAnswer, Reply, ReplyKind, SelectedIntent, UnderstandingResult,
    APPOINTMENT_TIME_ENTITY,
};
use crate::services::scheduler::SchedulingBackend;

/// True when `intent` is the top intent and clears its confidence threshold.
pub fn is_intent_selected(understanding: Option<&UnderstandingResult>, intent: Intent) -> bool {
    let Some(u) = understanding else {
        return false;
    };

    // Unrecognized top intents never match an actionable one.
    if u.top_intent.as_deref().and_then(Intent::parse) != Some(intent) {
        return false;
    }

    u.score(intent.as_str())
        .is_some_and(|score| score >= intent.threshold())
}

pub fn select_intent(
    understanding: Option<&UnderstandingResult>,
    intent: Intent,
) -> Option<SelectedIntent> {
    if !is_intent_selected(understanding, intent) {
        return None;
    }
    let u = understanding?;

    let requested_time = if intent.needs_time_slot() {
        extract_time(u).map(|t| t.to_string())
    } else {
        None
    };

    Some(SelectedIntent {
        intent,
        score: u.score(intent.as_str())?,
        requested_time,
    })
}

/// First `appointment_time` span only; later mentions are ignored.
pub fn extract_time(understanding: &UnderstandingResult) -> Option<&str> {
    understanding
        .spans(APPOINTMENT_TIME_ENTITY)
        .first()
        .map(|span| span.text.as_str())
}

pub async fn handle_utterance(
    understanding: Option<&UnderstandingResult>,
    answers: &[KnowledgeAnswer],
    backend: &dyn SchedulingBackend,
) -> anyhow::Result<Reply> {
    let selected = Intent::DISPATCH_ORDER
        .iter()
        .find_map(|intent| select_intent(understanding, *intent));

    let Some(selected) = selected else {
        return Ok(knowledge_fallback(answers));
    };

    tracing::debug!(
        intent = selected.intent.as_str(),
        score = selected.score,
        requested_time = ?selected.requested_time,
        "intent selected"
    );

    match (selected.intent, selected.requested_time) {
        (Intent::GetAvailability, _) => {
            let text = backend.get_availability().await?;
            Ok(Reply::new(ReplyKind::Availability, text))
        }
        (Intent::ScheduleAppointment, None) => Ok(Reply::time_prompt()),
        (Intent::ScheduleAppointment, Some(time)) => {
            let text = backend.schedule_appointment(&time).await?;
            Ok(Reply::new(ReplyKind::Scheduled, text))
        }
    }
}

fn knowledge_fallback(answers: &[KnowledgeAnswer]) -> Reply {
    match answers.first() {
        Some(best) => Reply::new(ReplyKind::KnowledgeAnswer, best.answer.clone()),
        None => Reply::help(),
    }
}
