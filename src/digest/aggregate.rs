//! Forecast aggregation
//!
//! Reduces a day of village forecast records into the temperature extremes
//! and the highest precipitation-probability slots. The temperature selection
//! rules are order-dependent and intentionally differ from a global min/max:
//!
//! - minimum: the first TMN record is kept, except that the first record at or
//!   after 08:00 replaces a selection made before 08:00;
//! - maximum: the first TMX record is kept, except that a record at exactly
//!   15:00 replaces it.

use crate::Result;
use crate::error::DigestError;
use crate::models::{ForecastCategory, ForecastRecord, ForecastSummary, RainSlot, TemperatureExtreme};
use tracing::debug;

/// Number of rain slots reported in the digest
pub const TOP_RAIN_SLOTS: usize = 3;

const DAYTIME_START: &str = "0800";
const AUTHORITATIVE_MAX_TIME: &str = "1500";

/// Aggregate forecast records into a [`ForecastSummary`].
///
/// Missing categories yield `None` extremes or an empty rain list.
/// Non-numeric values in POP, TMN or TMX records fail with a parse error.
pub fn aggregate(records: &[ForecastRecord]) -> Result<ForecastSummary> {
    let mut min_records = Vec::new();
    let mut max_records = Vec::new();
    let mut pop_records = Vec::new();

    for record in records {
        match record.category {
            ForecastCategory::Tmn => min_records.push(record),
            ForecastCategory::Tmx => max_records.push(record),
            ForecastCategory::Pop => pop_records.push(record),
            ForecastCategory::Sky | ForecastCategory::Pty | ForecastCategory::Other(_) => {}
        }
    }

    debug!(
        "Aggregating {} TMN, {} TMX and {} POP records",
        min_records.len(),
        max_records.len(),
        pop_records.len()
    );

    // every TMN/TMX value must parse, selected or not
    let min_candidates = to_extremes(&min_records)?;
    let max_candidates = to_extremes(&max_records)?;

    Ok(ForecastSummary {
        temp_min: select_min(min_candidates),
        temp_max: select_max(max_candidates),
        top_rain: top_rain_slots(&pop_records, TOP_RAIN_SLOTS)?,
    })
}

fn to_extremes(records: &[&ForecastRecord]) -> Result<Vec<TemperatureExtreme>> {
    records.iter().map(|record| to_extreme(record)).collect()
}

fn select_min(candidates: Vec<TemperatureExtreme>) -> Option<TemperatureExtreme> {
    let mut selected: Option<TemperatureExtreme> = None;

    for candidate in candidates {
        let replace = match &selected {
            None => true,
            Some(current) => {
                current.time.as_str() < DAYTIME_START && candidate.time.as_str() >= DAYTIME_START
            }
        };
        if replace {
            selected = Some(candidate);
        }
    }

    selected
}

fn select_max(candidates: Vec<TemperatureExtreme>) -> Option<TemperatureExtreme> {
    let mut selected: Option<TemperatureExtreme> = None;

    for candidate in candidates {
        if selected.is_none() || candidate.time == AUTHORITATIVE_MAX_TIME {
            selected = Some(candidate);
        }
    }

    selected
}

fn top_rain_slots(records: &[&ForecastRecord], limit: usize) -> Result<Vec<RainSlot>> {
    let mut slots = records
        .iter()
        .map(|record| {
            Ok(RainSlot {
                time: record.time.clone(),
                probability: parse_probability(record)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // stable: ties keep input order
    slots.sort_by(|a, b| b.probability.cmp(&a.probability));
    slots.truncate(limit);
    Ok(slots)
}

fn to_extreme(record: &ForecastRecord) -> Result<TemperatureExtreme> {
    let value = record
        .value
        .trim()
        .parse::<f64>()
        .map_err(|_| DigestError::parse(format!("non-numeric temperature in record {record}")))?;

    if !value.is_finite() {
        return Err(DigestError::parse(format!(
            "non-finite temperature in record {record}"
        )));
    }

    Ok(TemperatureExtreme {
        value,
        time: record.time.clone(),
    })
}

fn parse_probability(record: &ForecastRecord) -> Result<u8> {
    let raw = record.value.trim();
    let raw = raw.strip_suffix('%').unwrap_or(raw);

    let probability = raw
        .parse::<u8>()
        .map_err(|_| DigestError::parse(format!("non-numeric probability in record {record}")))?;

    if probability > 100 {
        return Err(DigestError::parse(format!(
            "probability out of range in record {record}"
        )));
    }

    Ok(probability)
}
