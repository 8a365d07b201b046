//! Air-quality measurement model

use serde::{Deserialize, Serialize};
use std::fmt;

/// One real-time pollutant measurement for a station
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQualityReading {
    /// PM10 grade code ("1".."4")
    pub pm10_grade: Option<String>,
    /// PM2.5 grade code ("1".."4")
    pub pm25_grade: Option<String>,
    /// Integrated air-quality grade code ("1".."4")
    pub overall_grade: Option<String>,
    pub station_name: Option<String>,
    /// Measurement timestamp as reported ("YYYY-MM-DD HH:MM")
    pub measured_at: Option<String>,
    /// PM10 concentration in µg/m³
    pub pm10_value: Option<String>,
    /// PM2.5 concentration in µg/m³
    pub pm25_value: Option<String>,
}

/// Severity label for a pollutant grade code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLabel {
    Good,
    Moderate,
    Unhealthy,
    VeryUnhealthy,
    Unknown,
}

impl GradeLabel {
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            GradeLabel::Good => "😊",
            GradeLabel::Moderate => "😐",
            GradeLabel::Unhealthy => "😷",
            GradeLabel::VeryUnhealthy => "🤢",
            GradeLabel::Unknown => "❔",
        }
    }

    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            GradeLabel::Good => "Good",
            GradeLabel::Moderate => "Moderate",
            GradeLabel::Unhealthy => "Unhealthy",
            GradeLabel::VeryUnhealthy => "Very unhealthy",
            GradeLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.text())
    }
}

/// Graded PM10, PM2.5 and overall values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQualitySummary {
    pub pm10: GradeLabel,
    pub pm25: GradeLabel,
    pub overall: GradeLabel,
    /// PM10 concentration in µg/m³, when the station reported one
    pub pm10_value: Option<u32>,
    /// PM2.5 concentration in µg/m³, when the station reported one
    pub pm25_value: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_label_rendering() {
        assert_eq!(GradeLabel::Good.to_string(), "😊 Good");
        assert_eq!(GradeLabel::VeryUnhealthy.to_string(), "🤢 Very unhealthy");
        assert_eq!(GradeLabel::Unknown.to_string(), "❔ Unknown");
    }
}
