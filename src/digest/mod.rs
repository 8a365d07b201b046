//! Digest core
//!
//! Pure, synchronous reduction of fetched records into the digest text:
//! - Grade mapping for pollutant codes
//! - Forecast aggregation (temperature extremes, top rain slots)
//! - Current condition from the sky and precipitation codes
//! - Air-quality normalization
//! - Keyword alert filtering
//! - Digest formatting

pub mod aggregate;
pub mod air_quality;
pub mod alerts;
pub mod condition;
pub mod format;
pub mod grade;

pub use aggregate::{TOP_RAIN_SLOTS, aggregate};
pub use air_quality::normalize;
pub use alerts::filter_alerts;
pub use condition::current_condition;
pub use format::{condition_line, format_digest, format_hhmm, title_line};
pub use grade::grade;
