use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::MessagingProvider;
use crate::errors::AppError;
use crate::models::Activity;

const TOKEN_URL: &str = "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";
const TOKEN_SCOPE: &str = "https://api.botframework.com/.default";
/// Tokens are refreshed this long before they actually expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct BotConnectorProvider {
    app_id: String,
    app_password: String,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl BotConnectorProvider {
    pub fn new(app_id: String, app_password: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build connector HTTP client")?;

        Ok(Self {
            app_id,
            app_password,
            client,
            token: Mutex::new(None),
        })
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard
            .as_ref()
            .filter(|t| t.expires_at > now)
            .map(|t| t.access_token.clone())
    }

    /// `None` when no app id is configured (local emulator).
    async fn access_token(&self) -> anyhow::Result<Option<String>> {
        if self.app_id.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        if let Some(token) = self.cached_token(now) {
            return Ok(Some(token));
        }

        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_password.as_str()),
                ("scope", TOKEN_SCOPE),
            ])
            .send()
            .await
            .context("failed to request connector token")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Messaging(format!("token endpoint returned {status}")).into());
        }

        let token: TokenResponse = resp
            .json()
            .await
            .context("failed to parse connector token")?;

        let expires_at =
            now + chrono::Duration::seconds(token.expires_in - TOKEN_REFRESH_MARGIN_SECS);
        if let Ok(mut cache) = self.token.lock() {
            *cache = Some(CachedToken {
                access_token: token.access_token.clone(),
                expires_at,
            });
        }

        Ok(Some(token.access_token))
    }
}

#[async_trait]
impl MessagingProvider for BotConnectorProvider {
    async fn send_reply(&self, incoming: &Activity, text: &str) -> anyhow::Result<()> {
        let url = incoming.reply_url()?;
        let reply = incoming.reply_with_text(text);

        let mut request = self.client.post(&url).json(&reply);
        if let Some(token) = self.access_token().await? {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .context("failed to send connector activity")?
            .error_for_status()
            .context("connector returned error")?;

        Ok(())
    }
}
