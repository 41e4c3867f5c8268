use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Message,
    ConversationUpdate,
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Message => "message",
            ActivityKind::ConversationUpdate => "conversationUpdate",
            ActivityKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "message" => ActivityKind::Message,
            "conversationUpdate" => ActivityKind::ConversationUpdate,
            _ => ActivityKind::Other,
        }
    }
}

/// Bot Framework activity, trimmed to the fields the bot reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    pub fn activity_kind(&self) -> ActivityKind {
        ActivityKind::parse(&self.kind)
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient.as_ref().map(|r| r.id.as_str())
    }

    /// Builds the outgoing message that answers this activity in the same conversation.
    pub fn reply_with_text(&self, text: &str) -> Activity {
        Activity {
            kind: ActivityKind::Message.as_str().to_string(),
            id: None,
            text: Some(text.to_string()),
            speak: Some(text.to_string()),
            service_url: self.service_url.clone(),
            channel_id: self.channel_id.clone(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            conversation: self.conversation.clone(),
            members_added: Vec::new(),
            reply_to_id: self.id.clone(),
        }
    }

    /// Connector URL a reply to this activity is posted to.
    pub fn reply_url(&self) -> Result<String, AppError> {
        let service_url = self
            .service_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest("activity has no serviceUrl".to_string()))?;
        let conversation = self
            .conversation
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("activity has no conversation".to_string()))?;

        let base = reqwest::Url::parse(service_url)
            .map_err(|e| AppError::BadRequest(format!("invalid serviceUrl: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::BadRequest(format!(
                "serviceUrl cannot be a base: {service_url}"
            )));
        }

        // Ids are encoded as whole path segments (Teams ids carry ':', ';' and '@').
        let mut url = format!(
            "{}/v3/conversations/{}/activities",
            base.as_str().trim_end_matches('/'),
            urlencoding::encode(&conversation.id)
        );
        if let Some(id) = &self.id {
            url.push('/');
            url.push_str(&urlencoding::encode(id));
        }
        Ok(url)
    }
}
