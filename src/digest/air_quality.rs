use super::grade::grade;
use crate::Result;
use crate::error::DigestError;
use crate::models::{AirQualityReading, AirQualitySummary};

/// Grade each pollutant field of a reading.
///
/// Only an absent reading is an error; absent grade fields become `Unknown`
/// and concentrations that are missing or not a number (AirKorea sends "-"
/// during station outages) are dropped.
pub fn normalize(reading: Option<&AirQualityReading>) -> Result<AirQualitySummary> {
    let reading = reading
        .ok_or_else(|| DigestError::missing_data("no air-quality reading for the station"))?;

    Ok(AirQualitySummary {
        pm10: grade(reading.pm10_grade.as_deref().unwrap_or("")),
        pm25: grade(reading.pm25_grade.as_deref().unwrap_or("")),
        overall: grade(reading.overall_grade.as_deref().unwrap_or("")),
        pm10_value: concentration(reading.pm10_value.as_deref()),
        pm25_value: concentration(reading.pm25_value.as_deref()),
    })
}

fn concentration(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}
