use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::SchedulingBackend;
use crate::errors::AppError;

pub struct HttpScheduler {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpScheduler {
    pub fn new(endpoint: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scheduler HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl SchedulingBackend for HttpScheduler {
    async fn get_availability(&self) -> anyhow::Result<String> {
        let resp = self
            .client
            .get(format!("{}/availability", self.endpoint))
            .send()
            .await
            .context("failed to call scheduler availability")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Scheduler(format!("availability returned {status}")).into());
        }

        let times: Vec<String> = resp
            .json()
            .await
            .context("failed to parse scheduler availability")?;

        Ok(format_availability(&times))
    }

    async fn schedule_appointment(&self, time: &str) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/schedule", self.endpoint))
            .json(&json!({ "time": time }))
            .send()
            .await
            .context("failed to call scheduler schedule")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Scheduler(format!("schedule returned {status}")).into());
        }

        Ok(format!("An appointment is set for {time}."))
    }
}

fn format_availability(times: &[String]) -> String {
    if times.is_empty() {
        return "There are no time slots available right now.".to_string();
    }
    format!("Current time slots available: {}", times.join(", "))
}
