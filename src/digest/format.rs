//! Digest text rendering

use crate::Result;
use crate::error::DigestError;
use crate::models::{
    AirQualitySummary, AlertRecord, Condition, GradeLabel, RainSlot, TemperatureExtreme,
};
use chrono::NaiveDate;

/// Convert an HHMM forecast time into "HH:MM".
///
/// The input must be exactly four ASCII digits forming a valid 24h time.
pub fn format_hhmm(time: &str) -> Result<String> {
    if time.len() != 4 || !time.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DigestError::format(format!(
            "expected 4-digit HHMM time, got '{time}'"
        )));
    }

    let (hours, minutes) = time.split_at(2);
    let hour: u8 = hours
        .parse()
        .map_err(|_| DigestError::format(format!("invalid hour in '{time}'")))?;
    let minute: u8 = minutes
        .parse()
        .map_err(|_| DigestError::format(format!("invalid minute in '{time}'")))?;

    if hour > 23 || minute > 59 {
        return Err(DigestError::format(format!(
            "'{time}' is not a valid time of day"
        )));
    }

    Ok(format!("{hours}:{minutes}"))
}

/// Heading placed above the digest body by the pipeline
#[must_use]
pub fn title_line(target_name: &str, date: NaiveDate) -> String {
    format!("📅 Weather for {target_name} ({})", date.format("%Y-%m-%d"))
}

/// Current-condition line placed under the title by the pipeline
#[must_use]
pub fn condition_line(condition: Condition) -> String {
    format!("{} Now: {}", condition.icon(), condition.text())
}

/// Render the digest body.
///
/// Sections always appear in the same order: temperature extremes, rain
/// slots, air quality, then alerts when there are any.
pub fn format_digest(
    temp_min: Option<&TemperatureExtreme>,
    temp_max: Option<&TemperatureExtreme>,
    top_rain: &[RainSlot],
    air_quality: &AirQualitySummary,
    alerts: &[AlertRecord],
) -> Result<String> {
    let mut lines = vec![
        temperature_line("Lowest", temp_min)?,
        temperature_line("Highest", temp_max)?,
    ];

    if top_rain.is_empty() {
        lines.push("☔ Rain chance: none forecast".to_string());
    } else {
        lines.push("☔ Rain chance:".to_string());
        for (rank, slot) in top_rain.iter().enumerate() {
            lines.push(format!(
                "{}. {} - {}%",
                rank + 1,
                format_hhmm(&slot.time)?,
                slot.probability
            ));
        }
    }

    lines.push(format!("{} Air quality:", air_quality.overall.icon()));
    lines.push(pollutant_line("PM10", air_quality.pm10, air_quality.pm10_value));
    lines.push(pollutant_line("PM2.5", air_quality.pm25, air_quality.pm25_value));
    lines.push(format!("Overall: {}", air_quality.overall));

    if !alerts.is_empty() {
        lines.push("⚠️ Weather alerts:".to_string());
        lines.extend(alerts.iter().map(alert_line));
    }

    Ok(lines.join("\n"))
}

fn temperature_line(label: &str, extreme: Option<&TemperatureExtreme>) -> Result<String> {
    match extreme {
        Some(extreme) => Ok(format!(
            "🌡️ {label}: {:.1}°C at {}",
            extreme.value,
            format_hhmm(&extreme.time)?
        )),
        None => Ok(format!("🌡️ {label}: n/a")),
    }
}

fn pollutant_line(label: &str, grade: GradeLabel, value: Option<u32>) -> String {
    match value {
        Some(value) => format!("{label}: {grade} ({value} µg/m³)"),
        None => format!("{label}: {grade}"),
    }
}

fn alert_line(alert: &AlertRecord) -> String {
    // multi-line bulletins collapse onto the single alert line
    let detail = alert.detail().split_whitespace().collect::<Vec<_>>().join(" ");
    let region = alert.region();

    if region.is_empty() {
        format!("- {}: {}", alert.headline(), detail)
    } else {
        format!("- {}: {} ({})", alert.headline(), detail, region)
    }
}
