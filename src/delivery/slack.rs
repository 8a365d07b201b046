//! Slack delivery through the Web API or an incoming webhook

use super::DeliverySink;
use crate::Result;
use crate::error::DigestError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Posts with a bot token via `chat.postMessage`
pub struct SlackBotSink {
    client: Client,
    token: String,
}

impl SlackBotSink {
    #[must_use]
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl DeliverySink for SlackBotSink {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: destination,
                text,
            })
            .send()
            .await
            .map_err(|e| DigestError::delivery(format!("Slack request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::delivery(format!(
                "Slack API returned HTTP {status}"
            )));
        }

        // Slack reports failures with HTTP 200 and ok=false
        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DigestError::delivery(format!("Unreadable Slack response: {e}")))?;

        if !body.ok {
            return Err(DigestError::delivery(format!(
                "Slack rejected the message: {}",
                body.error.as_deref().unwrap_or("unknown error")
            )));
        }

        info!("Message sent to Slack channel {}", destination);
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

/// Posts to an incoming webhook
pub struct SlackWebhookSink {
    client: Client,
    webhook_url: String,
    username: String,
    icon_emoji: String,
}

impl SlackWebhookSink {
    #[must_use]
    pub fn new(client: Client, webhook_url: String, username: String, icon_emoji: String) -> Self {
        Self {
            client,
            webhook_url,
            username,
            icon_emoji,
        }
    }
}

#[async_trait]
impl DeliverySink for SlackWebhookSink {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
        // webhooks are bound to a channel; an override is only sent when given
        let channel = Some(destination).filter(|d| !d.is_empty());

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload {
                text,
                username: &self.username,
                icon_emoji: &self.icon_emoji,
                channel,
            })
            .send()
            .await
            .map_err(|e| DigestError::delivery(format!("Slack webhook request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("Slack webhook answered {}: {}", status, body);

        if !status.is_success() {
            return Err(DigestError::delivery(format!(
                "Slack webhook returned HTTP {status}: {body}"
            )));
        }

        info!("Message sent to Slack webhook");
        Ok(())
    }
}
