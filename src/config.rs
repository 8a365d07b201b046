//! Configuration management for the weather digest
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DigestError;
use crate::source::grid::{GridPoint, to_grid};
use anyhow::{Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the weather digest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Public data portal API configuration
    pub api: ApiConfig,
    /// Forecast target and measuring station
    pub target: TargetConfig,
    /// Alert filtering settings
    pub alerts: AlertsConfig,
    /// Chat delivery settings
    pub delivery: DeliveryConfig,
    /// Daily schedule settings
    pub schedule: ScheduleConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Public data portal API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service key issued by the data portal (decoded form)
    pub service_key: Option<String>,
    /// Base URL for all data APIs
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u32,
}

/// Where the digest is about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Display name used in the digest title
    #[serde(default = "default_target_name")]
    pub name: String,
    /// Forecast grid X, takes precedence over coordinates
    pub nx: Option<u32>,
    /// Forecast grid Y, takes precedence over coordinates
    pub ny: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Air-quality measuring station name
    #[serde(default = "default_station_name")]
    pub station_name: String,
    /// IANA time zone used for "today" and the schedule
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Alert filtering settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Alerts are kept when any keyword appears in their text
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Optional forecast office id (`stnId`) for the alert API
    pub station_id: Option<String>,
}

/// Supported chat sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    SlackBot,
    #[default]
    SlackWebhook,
    Telegram,
}

/// Chat delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub kind: DeliveryKind,
    /// Channel name or chat id
    pub destination: Option<String>,
    /// Bot token (Slack bot or Telegram)
    pub token: Option<String>,
    /// Incoming webhook URL (Slack webhook)
    pub webhook_url: Option<String>,
    /// Display name for webhook posts
    #[serde(default = "default_username")]
    pub username: String,
    /// Icon for webhook posts
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
}

/// Daily schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local time of day to send the digest ("HH:MM")
    #[serde(default = "default_schedule_time")]
    pub time: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_base_url() -> String {
    "https://apis.data.go.kr".to_string()
}

fn default_api_timeout() -> u32 {
    30
}

fn default_target_name() -> String {
    "Seoul".to_string()
}

fn default_station_name() -> String {
    "종로구".to_string()
}

fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}

fn default_username() -> String {
    "WeatherBot".to_string()
}

fn default_icon_emoji() -> String {
    ":sun_with_face:".to_string()
}

fn default_schedule_time() -> String {
    "07:00".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_key: None,
            base_url: default_api_base_url(),
            timeout_seconds: default_api_timeout(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: default_target_name(),
            nx: None,
            ny: None,
            latitude: None,
            longitude: None,
            station_name: default_station_name(),
            timezone: default_timezone(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            kind: DeliveryKind::default(),
            destination: None,
            token: None,
            webhook_url: None,
            username: default_username(),
            icon_emoji: default_icon_emoji(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: default_schedule_time(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DigestConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_DIGEST_API__SERVICE_KEY, WEATHER_DIGEST_ALERTS__KEYWORDS=a,b, ...
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_DIGEST")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("alerts.keywords")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DigestConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-digest").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.base_url.is_empty() {
            self.api.base_url = default_api_base_url();
        }
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_api_timeout();
        }
        if self.target.name.is_empty() {
            self.target.name = default_target_name();
        }
        if self.target.station_name.is_empty() {
            self.target.station_name = default_station_name();
        }
        if self.target.timezone.is_empty() {
            self.target.timezone = default_timezone();
        }
        if self.delivery.username.is_empty() {
            self.delivery.username = default_username();
        }
        if self.delivery.icon_emoji.is_empty() {
            self.delivery.icon_emoji = default_icon_emoji();
        }
        if self.schedule.time.is_empty() {
            self.schedule.time = default_schedule_time();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_target()?;
        self.validate_alerts()?;
        self.validate_delivery()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match &self.api.service_key {
            None => Err(DigestError::config(
                "Missing data portal service key. Set api.service_key or WEATHER_DIGEST_API__SERVICE_KEY.",
            )
            .into()),
            Some(key) if key.trim().is_empty() => {
                Err(DigestError::config("Data portal service key cannot be empty.").into())
            }
            Some(key) if key.len() < 16 => Err(DigestError::config(
                "Data portal service key appears to be invalid (too short). Please check your key.",
            )
            .into()),
            Some(_) => Ok(()),
        }
    }

    fn validate_target(&self) -> Result<()> {
        self.grid()?;
        self.timezone()?;

        if self.target.station_name.trim().is_empty() {
            return Err(DigestError::config("Air-quality station name cannot be empty").into());
        }

        Ok(())
    }

    fn validate_alerts(&self) -> Result<()> {
        if self.alerts.keywords.iter().any(String::is_empty) {
            return Err(DigestError::config(
                "Alert keywords cannot contain empty entries (they would match every alert)",
            )
            .into());
        }
        Ok(())
    }

    fn validate_delivery(&self) -> Result<()> {
        let delivery = &self.delivery;
        let missing = |value: &Option<String>| value.as_deref().is_none_or(str::is_empty);

        match delivery.kind {
            DeliveryKind::SlackBot | DeliveryKind::Telegram => {
                if missing(&delivery.token) {
                    return Err(DigestError::config(format!(
                        "delivery.token is required for {:?} delivery",
                        delivery.kind
                    ))
                    .into());
                }
                if missing(&delivery.destination) {
                    return Err(DigestError::config(format!(
                        "delivery.destination is required for {:?} delivery",
                        delivery.kind
                    ))
                    .into());
                }
            }
            DeliveryKind::SlackWebhook => match delivery.webhook_url.as_deref() {
                None | Some("") => {
                    return Err(DigestError::config(
                        "delivery.webhook_url is required for slack_webhook delivery",
                    )
                    .into());
                }
                Some(url) if !url.starts_with("https://") => {
                    return Err(
                        DigestError::config("Slack webhook URL must be an HTTPS URL").into()
                    );
                }
                Some(_) => {}
            },
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DigestError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DigestError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(
                DigestError::config("API base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        if self.api.timeout_seconds > 300 {
            return Err(DigestError::config("API timeout cannot exceed 300 seconds").into());
        }

        self.schedule_time()?;

        Ok(())
    }

    /// Forecast grid point, from `nx`/`ny` or converted from coordinates
    pub fn grid(&self) -> crate::Result<GridPoint> {
        let target = &self.target;
        match (target.nx, target.ny, target.latitude, target.longitude) {
            (Some(nx), Some(ny), _, _) => Ok(GridPoint { nx, ny }),
            (_, _, Some(lat), Some(lon)) => to_grid(lat, lon),
            _ => Err(DigestError::config(
                "Target needs either nx/ny grid coordinates or latitude/longitude",
            )),
        }
    }

    /// Parsed target time zone
    pub fn timezone(&self) -> crate::Result<Tz> {
        self.target.timezone.parse::<Tz>().map_err(|_| {
            DigestError::config(format!("Unknown time zone '{}'", self.target.timezone))
        })
    }

    /// Parsed daily run time
    pub fn schedule_time(&self) -> crate::Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.schedule.time, "%H:%M").map_err(|_| {
            DigestError::config(format!(
                "Invalid schedule time '{}'. Expected HH:MM",
                self.schedule.time
            ))
        })
    }
}
