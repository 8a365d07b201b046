//! Data sources for the digest
//!
//! The pipeline only depends on the [`FetchSource`] trait; the public data
//! portal client is the production implementation.

use crate::Result;
use crate::models::{AirQualityReading, AlertRecord, ForecastRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;

pub mod grid;
pub mod public_data;

pub use grid::{GridPoint, to_grid};
pub use public_data::PublicDataClient;

/// Supplies raw records per data category
///
/// `now` is the run's local wall-clock time; "today" is `now.date()`.
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Forecast records for `now`'s date at the target grid
    async fn forecast(&self, now: NaiveDateTime) -> Result<Vec<ForecastRecord>>;

    /// Latest measurement for the configured station, if any
    async fn air_quality(&self) -> Result<Option<AirQualityReading>>;

    /// Currently published alert bulletins (unfiltered)
    async fn alerts(&self, now: NaiveDateTime) -> Result<Vec<AlertRecord>>;
}
