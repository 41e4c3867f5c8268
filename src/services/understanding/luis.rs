use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::UnderstandingProvider;
use crate::errors::AppError;
use crate::models::{EntitySpan, UnderstandingResult};

pub struct LuisRecognizer {
    app_id: String,
    api_key: String,
    host_name: String,
    slot: String,
    client: reqwest::Client,
}

impl LuisRecognizer {
    pub fn new(
        app_id: String,
        api_key: String,
        host_name: String,
        slot: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build LUIS HTTP client")?;

        Ok(Self {
            app_id,
            api_key,
            host_name,
            slot,
            client,
        })
    }

    fn predict_url(&self) -> String {
        let host = self
            .host_name
            .trim_start_matches("https://")
            .trim_end_matches('/');
        format!(
            "https://{host}/luis/prediction/v3.0/apps/{}/slots/{}/predict",
            self.app_id, self.slot
        )
    }
}

#[async_trait]
impl UnderstandingProvider for LuisRecognizer {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<Option<UnderstandingResult>> {
        let resp = self
            .client
            .get(self.predict_url())
            .query(&[
                ("subscription-key", self.api_key.as_str()),
                ("query", utterance),
                ("verbose", "true"),
                ("show-all-intents", "true"),
                ("log", "true"),
            ])
            .send()
            .await
            .context("failed to call LUIS prediction API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse LUIS response")?;

        if !status.is_success() {
            return Err(AppError::Understanding(format!("LUIS returned {status}: {data}")).into());
        }

        Ok(parse_prediction(data))
    }
}

#[derive(Deserialize)]
struct PredictionResponse {
    prediction: Prediction,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    top_intent: Option<String>,
    #[serde(default)]
    intents: HashMap<String, IntentScore>,
    #[serde(default)]
    entities: PredictionEntities,
}

#[derive(Deserialize)]
struct IntentScore {
    score: f64,
}

#[derive(Deserialize, Default)]
struct PredictionEntities {
    #[serde(rename = "$instance", default)]
    instance: HashMap<String, Vec<EntityInstance>>,
}

#[derive(Deserialize)]
struct EntityInstance {
    text: String,
}

/// Maps a v3 prediction payload onto an [`UnderstandingResult`].
/// Payloads that do not have the prediction shape yield `None`.
fn parse_prediction(data: serde_json::Value) -> Option<UnderstandingResult> {
    let response: PredictionResponse = match serde_json::from_value(data) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed LUIS prediction, ignoring");
            return None;
        }
    };
    let prediction = response.prediction;

    let intent_scores = prediction
        .intents
        .into_iter()
        .map(|(name, intent)| (name, intent.score))
        .collect();

    let entities = prediction
        .entities
        .instance
        .into_iter()
        .map(|(kind, instances)| {
            let spans = instances
                .into_iter()
                .map(|i| EntitySpan { text: i.text })
                .collect();
            (kind, spans)
        })
        .collect();

    Some(UnderstandingResult {
        top_intent: prediction.top_intent,
        intent_scores,
        entities,
    })
}
