//! Current weather condition from the SKY/PTY forecast codes

use crate::models::{Condition, ForecastCategory, ForecastRecord};

/// Condition of the forecast slot in effect at `at` (HHMM).
///
/// That slot is the latest SKY/PTY time at or before `at`, or the earliest
/// one when the day's forecast starts later. A precipitation type other than
/// "0" wins over the sky state. Returns `None` when neither category is present.
#[must_use]
pub fn current_condition(records: &[ForecastRecord], at: &str) -> Option<Condition> {
    let slot_times = records
        .iter()
        .filter(|record| matches!(record.category, ForecastCategory::Sky | ForecastCategory::Pty))
        .map(|record| record.time.as_str());

    let slot = slot_times
        .clone()
        .filter(|time| *time <= at)
        .max()
        .or_else(|| slot_times.min())?;

    let code_at = |category: ForecastCategory| {
        records
            .iter()
            .find(|record| record.category == category && record.time == slot)
            .map(|record| record.value.trim())
    };

    let condition = match (code_at(ForecastCategory::Pty), code_at(ForecastCategory::Sky)) {
        (Some(pty), _) if pty != "0" => precipitation(pty),
        (_, Some(sky)) => sky_state(sky),
        _ => Condition::Unknown,
    };
    Some(condition)
}

fn precipitation(code: &str) -> Condition {
    match code {
        "1" => Condition::Rain,
        "2" => Condition::RainAndSnow,
        "3" => Condition::Snow,
        "4" => Condition::Shower,
        _ => Condition::Unknown,
    }
}

fn sky_state(code: &str) -> Condition {
    match code {
        "1" => Condition::Clear,
        "3" => Condition::MostlyCloudy,
        "4" => Condition::Overcast,
        _ => Condition::Unknown,
    }
}
