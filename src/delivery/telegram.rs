use super::DeliverySink;
use crate::Result;
use crate::error::DigestError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Posts through the Telegram Bot API `sendMessage`
pub struct TelegramSink {
    client: Client,
    token: String,
}

impl TelegramSink {
    #[must_use]
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = serde_json::json!({
            "chat_id": destination,
            "text": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            // the request error embeds the URL, which carries the token
            .map_err(|e| DigestError::delivery(format!("Telegram request failed: {}", e.without_url())))?;

        let status = response.status();
        let api: Option<ApiResponse> = response.json().await.ok();

        match api {
            Some(api) if status.is_success() && api.ok => {
                info!("Message sent to Telegram chat {}", destination);
                Ok(())
            }
            Some(api) => {
                let reason = api.description.unwrap_or_else(|| status.to_string());
                warn!("Telegram API returned {}: {}", status, reason);
                Err(DigestError::delivery(format!("Telegram rejected the message: {reason}")))
            }
            None => Err(DigestError::delivery(format!(
                "Telegram API returned {status} with an unreadable body"
            ))),
        }
    }
}
