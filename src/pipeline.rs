//! Digest pipeline
//!
//! One run is fetch → aggregate/normalize/filter → format → deliver, all
//! evaluated against a single local instant.
//! Any failure before delivery aborts the run, so a partial digest is never
//! sent. Nothing is carried over between runs.

use crate::Result;
use crate::config::DigestConfig;
use crate::delivery::{self, DeliverySink};
use crate::digest::{
    aggregate, condition_line, current_condition, filter_alerts, format_digest, normalize,
    title_line,
};
use crate::source::{FetchSource, PublicDataClient};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Per-run settings taken from the configuration
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Name shown in the digest title
    pub target_name: String,
    /// Channel or chat id passed to the sink
    pub destination: String,
    pub keywords: Vec<String>,
    pub timezone: Tz,
}

impl JobSettings {
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        Ok(Self {
            target_name: config.target.name.clone(),
            destination: config.delivery.destination.clone().unwrap_or_default(),
            keywords: config.alerts.keywords.clone(),
            timezone: config.timezone()?,
        })
    }
}

/// A configured digest run, reusable across scheduled invocations
pub struct DigestJob {
    source: Box<dyn FetchSource>,
    sink: Box<dyn DeliverySink>,
    settings: JobSettings,
}

impl DigestJob {
    #[must_use]
    pub fn new(
        source: Box<dyn FetchSource>,
        sink: Box<dyn DeliverySink>,
        settings: JobSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    /// Wire the data portal client and the configured sink
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let source = PublicDataClient::new(config)?;
        let sink = delivery::from_config(&config.delivery)?;
        Ok(Self::new(
            Box::new(source),
            sink,
            JobSettings::from_config(config)?,
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Fetch all sources and render the digest without delivering it
    pub async fn build_digest(&self) -> Result<String> {
        let now = Utc::now()
            .with_timezone(&self.settings.timezone)
            .naive_local();
        self.build_digest_at(now).await
    }

    /// Render the digest for the local time `now`.
    ///
    /// The forecast day, the alert window, the current-condition slot and the
    /// title date all come from this one instant.
    #[instrument(skip(self), fields(location = %self.settings.target_name))]
    pub async fn build_digest_at(&self, now: NaiveDateTime) -> Result<String> {
        let records = self.source.forecast(now).await?;
        let forecast = aggregate(&records)?;
        let condition = current_condition(&records, &now.format("%H%M").to_string());
        debug!(
            "Forecast summary: min {:?}, max {:?}, {} rain slots, condition {:?}",
            forecast.temp_min,
            forecast.temp_max,
            forecast.top_rain.len(),
            condition
        );

        let reading = self.source.air_quality().await?;
        let air_quality = normalize(reading.as_ref())?;

        let alerts = self.source.alerts(now).await?;
        let relevant = filter_alerts(&alerts, &self.settings.keywords);
        debug!(
            "{} of {} alerts match the configured keywords",
            relevant.len(),
            alerts.len()
        );

        let body = format_digest(
            forecast.temp_min.as_ref(),
            forecast.temp_max.as_ref(),
            &forecast.top_rain,
            &air_quality,
            &relevant,
        )?;

        let mut lines = vec![title_line(&self.settings.target_name, now.date())];
        lines.extend(condition.map(condition_line));
        lines.push(body);
        Ok(lines.join("\n"))
    }

    /// Build the digest and deliver it exactly once.
    ///
    /// Returns the delivered text. Errors are logged here once and returned.
    pub async fn run_once(&self) -> Result<String> {
        let start = Instant::now();
        info!("Starting digest run for {}", self.settings.target_name);

        let digest = match self.build_digest().await {
            Ok(digest) => digest,
            Err(e) => {
                error!(kind = e.kind(), "Digest run aborted, nothing sent: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self
            .sink
            .deliver(&self.settings.destination, &digest)
            .await
        {
            error!(kind = e.kind(), "Digest delivery failed: {}", e);
            return Err(e);
        }

        info!(
            "Digest delivered in {:.3}s ({} lines)",
            start.elapsed().as_secs_f64(),
            digest.lines().count()
        );
        Ok(digest)
    }
}
