use crate::models::AlertRecord;

/// Keep the alerts whose text mentions any of the keywords.
///
/// Matching is an exact, case-sensitive substring test against the
/// concatenation of all text fields. Input order is preserved.
#[must_use]
pub fn filter_alerts(alerts: &[AlertRecord], keywords: &[String]) -> Vec<AlertRecord> {
    alerts
        .iter()
        .filter(|alert| {
            let text = alert.text();
            keywords.iter().any(|keyword| text.contains(keyword.as_str()))
        })
        .cloned()
        .collect()
}
