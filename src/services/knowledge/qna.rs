use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::KnowledgeProvider;
use crate::errors::AppError;
use crate::models::KnowledgeAnswer;

/// Id the service uses for its "No good match found in KB." placeholder.
const NO_MATCH_ID: i64 = -1;

pub struct QnaMakerClient {
    knowledgebase_id: String,
    endpoint_key: String,
    host: String,
    top: u32,
    score_threshold: f64,
    client: reqwest::Client,
}

impl QnaMakerClient {
    pub fn new(
        knowledgebase_id: String,
        endpoint_key: String,
        host: String,
        top: u32,
        score_threshold: f64,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build QnA Maker HTTP client")?;

        Ok(Self {
            knowledgebase_id,
            endpoint_key,
            host,
            top: top.max(1),
            score_threshold,
            client,
        })
    }

    fn generate_answer_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let base = if host.ends_with("/qnamaker") {
            host
        } else {
            format!("{host}/qnamaker")
        };
        format!(
            "{base}/knowledgebases/{}/generateAnswer",
            self.knowledgebase_id
        )
    }
}

#[async_trait]
impl KnowledgeProvider for QnaMakerClient {
    async fn query(&self, utterance: &str) -> anyhow::Result<Vec<KnowledgeAnswer>> {
        let body = json!({
            "question": utterance,
            "top": self.top,
            "scoreThreshold": self.score_threshold * 100.0,
        });

        let resp = self
            .client
            .post(self.generate_answer_url())
            .header("Authorization", format!("EndpointKey {}", self.endpoint_key))
            .json(&body)
            .send()
            .await
            .context("failed to call QnA Maker generateAnswer")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse QnA Maker response")?;

        if !status.is_success() {
            return Err(AppError::Knowledge(format!("QnA Maker returned {status}: {data}")).into());
        }

        let parsed: GenerateAnswerResponse =
            serde_json::from_value(data).context("unexpected QnA Maker response shape")?;

        Ok(rank_answers(parsed.answers, self.score_threshold, self.top))
    }
}

#[derive(Deserialize)]
struct GenerateAnswerResponse {
    #[serde(default)]
    answers: Vec<QnaAnswer>,
}

#[derive(Deserialize)]
struct QnaAnswer {
    answer: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    id: i64,
    #[serde(default)]
    questions: Vec<String>,
}

/// Normalizes service scores (0-100) to 0-1, drops the placeholder and
/// low-scoring candidates, and orders the rest best first.
fn rank_answers(answers: Vec<QnaAnswer>, score_threshold: f64, top: u32) -> Vec<KnowledgeAnswer> {
    let mut ranked: Vec<KnowledgeAnswer> = answers
        .into_iter()
        .filter(|a| a.id != NO_MATCH_ID)
        .map(|a| KnowledgeAnswer {
            answer: a.answer,
            score: a.score / 100.0,
            questions: a.questions,
        })
        .filter(|a| a.score >= score_threshold)
        .collect();

    // sort_by is stable, so equal scores keep service order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top as usize);
    ranked
}
