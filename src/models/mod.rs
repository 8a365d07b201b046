//! Data models for the weather digest
//!
//! This module contains the domain models organized by data source:
//! - Forecast: village forecast records and the values derived from them
//! - Air quality: pollutant measurements and grade labels
//! - Alert: weather alert bulletins

pub mod air_quality;
pub mod alert;
pub mod forecast;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityReading, AirQualitySummary, GradeLabel};
pub use alert::AlertRecord;
pub use forecast::{
    Condition, ForecastCategory, ForecastRecord, ForecastSummary, RainSlot, TemperatureExtreme,
};
