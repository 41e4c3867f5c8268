use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Entity type that carries the appointment time the user asked for.
pub const APPOINTMENT_TIME_ENTITY: &str = "appointment_time";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySpan {
    pub text: String,
}

/// What the language understanding service made of one utterance.
///
/// `entities` is empty when the service returned no entity metadata at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnderstandingResult {
    pub top_intent: Option<String>,
    #[serde(default)]
    pub intent_scores: HashMap<String, f64>,
    #[serde(default)]
    pub entities: HashMap<String, Vec<EntitySpan>>,
}

impl UnderstandingResult {
    pub fn score(&self, intent_name: &str) -> Option<f64> {
        self.intent_scores.get(intent_name).copied()
    }

    pub fn spans(&self, entity_type: &str) -> &[EntitySpan] {
        self.entities
            .get(entity_type)
            .map(|spans| spans.as_slice())
            .unwrap_or(&[])
    }
}
