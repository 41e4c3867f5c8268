use std::env;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub microsoft_app_id: String,
    pub microsoft_app_password: String,
    pub luis_app_id: String,
    pub luis_api_key: String,
    pub luis_api_host_name: String,
    pub luis_slot: String,
    pub qna_knowledgebase_id: String,
    pub qna_endpoint_key: String,
    pub qna_endpoint_host_name: String,
    pub qna_top: u32,
    pub qna_score_threshold: f64,
    pub scheduler_endpoint: String,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3978),
            microsoft_app_id: env::var("MICROSOFT_APP_ID").unwrap_or_default(),
            microsoft_app_password: env::var("MICROSOFT_APP_PASSWORD").unwrap_or_default(),
            luis_app_id: env::var("LUIS_APP_ID").unwrap_or_default(),
            luis_api_key: env::var("LUIS_API_KEY").unwrap_or_default(),
            luis_api_host_name: env::var("LUIS_API_HOST_NAME").unwrap_or_default(),
            luis_slot: env::var("LUIS_SLOT").unwrap_or_else(|_| "production".to_string()),
            qna_knowledgebase_id: env::var("QNA_KNOWLEDGEBASE_ID").unwrap_or_default(),
            qna_endpoint_key: env::var("QNA_ENDPOINT_KEY").unwrap_or_default(),
            qna_endpoint_host_name: env::var("QNA_ENDPOINT_HOST_NAME").unwrap_or_default(),
            qna_top: env::var("QNA_TOP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            qna_score_threshold: env::var("QNA_SCORE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.3),
            scheduler_endpoint: env::var("SCHEDULER_ENDPOINT").unwrap_or_default(),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Fails on the first collaborator setting that is required but empty.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("LUIS_APP_ID", &self.luis_app_id),
            ("LUIS_API_KEY", &self.luis_api_key),
            ("LUIS_API_HOST_NAME", &self.luis_api_host_name),
            ("QNA_KNOWLEDGEBASE_ID", &self.qna_knowledgebase_id),
            ("QNA_ENDPOINT_KEY", &self.qna_endpoint_key),
            ("QNA_ENDPOINT_HOST_NAME", &self.qna_endpoint_host_name),
            ("SCHEDULER_ENDPOINT", &self.scheduler_endpoint),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::Config(format!("{name} must be set")));
        }

        if !(0.0..=1.0).contains(&self.qna_score_threshold) {
            return Err(AppError::Config(format!(
                "QNA_SCORE_THRESHOLD must be between 0 and 1, got {}",
                self.qna_score_threshold
            )));
        }

        // An app id without its password can never obtain a connector token.
        if !self.microsoft_app_id.is_empty() && self.microsoft_app_password.is_empty() {
            return Err(AppError::Config(
                "MICROSOFT_APP_PASSWORD must be set when MICROSOFT_APP_ID is set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_dev_mode(&self) -> bool {
        self.microsoft_app_id.is_empty()
    }
}
