use serde::{Deserialize, Serialize};

/// One knowledge-base candidate. Lists of these are ordered best first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeAnswer {
    pub answer: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub questions: Vec<String>,
}

impl KnowledgeAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            score: 1.0,
            questions: Vec::new(),
        }
    }
}
