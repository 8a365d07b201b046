//! `weather-digest` - Daily weather digest for chat
//!
//! This library fetches the village forecast, real-time air quality and
//! weather alerts, reduces them to a short digest and delivers it to a chat
//! channel.

pub mod config;
pub mod delivery;
pub mod digest;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod source;

// Re-export core types for public API
pub use config::DigestConfig;
pub use delivery::DeliverySink;
pub use error::DigestError;
pub use models::{
    AirQualityReading, AirQualitySummary, AlertRecord, Condition, ForecastCategory, ForecastRecord,
    ForecastSummary, GradeLabel, RainSlot, TemperatureExtreme,
};
pub use pipeline::{DigestJob, JobSettings};
pub use source::FetchSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DigestError>;
