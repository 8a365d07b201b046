//! Forecast record model and the values derived from it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forecast category code as published by the village forecast API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ForecastCategory {
    /// Probability of precipitation (%)
    Pop,
    /// Daily minimum temperature (°C)
    Tmn,
    /// Daily maximum temperature (°C)
    Tmx,
    /// Sky state code (1 clear, 3 mostly cloudy, 4 overcast)
    Sky,
    /// Precipitation type code (0 none, 1 rain, 2 rain/snow, 3 snow, 4 shower)
    Pty,
    /// Any other category; ignored by the aggregator
    Other(String),
}

impl ForecastCategory {
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            ForecastCategory::Pop => "POP",
            ForecastCategory::Tmn => "TMN",
            ForecastCategory::Tmx => "TMX",
            ForecastCategory::Sky => "SKY",
            ForecastCategory::Pty => "PTY",
            ForecastCategory::Other(code) => code,
        }
    }
}

impl From<&str> for ForecastCategory {
    fn from(code: &str) -> Self {
        match code {
            "POP" => ForecastCategory::Pop,
            "TMN" => ForecastCategory::Tmn,
            "TMX" => ForecastCategory::Tmx,
            "SKY" => ForecastCategory::Sky,
            "PTY" => ForecastCategory::Pty,
            other => ForecastCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for ForecastCategory {
    fn from(code: String) -> Self {
        ForecastCategory::from(code.as_str())
    }
}

impl From<ForecastCategory> for String {
    fn from(category: ForecastCategory) -> Self {
        category.code().to_string()
    }
}

impl fmt::Display for ForecastCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One (category, time, value) row of the forecast feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub category: ForecastCategory,
    /// Forecast time as HHMM (24h)
    pub time: String,
    /// Raw value, a number or a percentage
    pub value: String,
}

impl ForecastRecord {
    #[must_use]
    pub fn new(
        category: impl Into<ForecastCategory>,
        time: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            time: time.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ForecastRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}='{}'", self.category, self.time, self.value)
    }
}

/// Precipitation probability for a single forecast slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainSlot {
    /// HHMM
    pub time: String,
    /// Probability in percent (0-100)
    pub probability: u8,
}

/// Selected minimum or maximum temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureExtreme {
    /// Temperature in Celsius
    pub value: f64,
    /// HHMM of the record this value came from
    pub time: String,
}

/// Weather at one forecast slot, from its SKY and PTY codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    MostlyCloudy,
    Overcast,
    Rain,
    RainAndSnow,
    Snow,
    Shower,
    Unknown,
}

impl Condition {
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Condition::Clear => "☀️",
            Condition::MostlyCloudy => "⛅",
            Condition::Overcast => "☁️",
            Condition::Rain => "🌧",
            Condition::RainAndSnow => "🌨",
            Condition::Snow => "❄️",
            Condition::Shower => "🌦",
            Condition::Unknown => "❓",
        }
    }

    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::MostlyCloudy => "Mostly cloudy",
            Condition::Overcast => "Overcast",
            Condition::Rain => "Rain",
            Condition::RainAndSnow => "Rain and snow",
            Condition::Snow => "Snow",
            Condition::Shower => "Showers",
            Condition::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.text())
    }
}

/// Result of reducing one day of forecast records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub temp_min: Option<TemperatureExtreme>,
    pub temp_max: Option<TemperatureExtreme>,
    /// Highest precipitation probabilities, at most three
    pub top_rain: Vec<RainSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ForecastCategory::from("POP"), ForecastCategory::Pop);
        assert_eq!(ForecastCategory::from("TMN"), ForecastCategory::Tmn);
        assert_eq!(ForecastCategory::from("TMX"), ForecastCategory::Tmx);
        assert_eq!(ForecastCategory::from("SKY"), ForecastCategory::Sky);
        assert_eq!(
            ForecastCategory::from("TMP"),
            ForecastCategory::Other("TMP".to_string())
        );
    }

    #[test]
    fn test_category_deserializes_from_api_code() {
        let record: ForecastRecord =
            serde_json::from_str(r#"{"category":"TMX","time":"1500","value":"22.0"}"#).unwrap();
        assert_eq!(record.category, ForecastCategory::Tmx);
        assert_eq!(record.to_string(), "TMX@1500='22.0'");
    }
}
