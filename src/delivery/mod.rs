//! Chat delivery
//!
//! A [`DeliverySink`] accepts the finished digest and a destination id.
//! Sinks make a single attempt; failures surface as delivery errors.

use crate::Result;
use crate::config::{DeliveryConfig, DeliveryKind};
use crate::error::DigestError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub mod slack;
pub mod telegram;

pub use slack::{SlackBotSink, SlackWebhookSink};
pub use telegram::TelegramSink;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Accepts a formatted digest for a destination
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, destination: &str, text: &str) -> Result<()>;
}

/// Build the sink selected by `delivery.kind`
pub fn from_config(config: &DeliveryConfig) -> Result<Box<dyn DeliverySink>> {
    let client = Client::builder()
        .timeout(DELIVERY_TIMEOUT)
        .build()
        .map_err(|e| DigestError::config(format!("Failed to create HTTP client: {e}")))?;

    let required = |value: &Option<String>, name: &str| {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DigestError::config(format!("delivery.{name} is not set")))
    };

    let sink: Box<dyn DeliverySink> = match config.kind {
        DeliveryKind::SlackBot => Box::new(SlackBotSink::new(
            client,
            required(&config.token, "token")?,
        )),
        DeliveryKind::SlackWebhook => Box::new(SlackWebhookSink::new(
            client,
            required(&config.webhook_url, "webhook_url")?,
            config.username.clone(),
            config.icon_emoji.clone(),
        )),
        DeliveryKind::Telegram => Box::new(TelegramSink::new(
            client,
            required(&config.token, "token")?,
        )),
    };

    Ok(sink)
}
