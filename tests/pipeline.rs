//! End-to-end digest runs against in-memory sources and sinks

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};
use weather_digest::{
    AirQualityReading, AlertRecord, DeliverySink, DigestError, DigestJob, FetchSource,
    ForecastRecord, JobSettings,
};

#[derive(Clone)]
enum Fail {
    Forecast,
    AirQuality,
    Alerts,
}

#[derive(Clone)]
struct FakeSource {
    forecast: Vec<ForecastRecord>,
    air_quality: Option<AirQualityReading>,
    alerts: Vec<AlertRecord>,
    fail: Option<Fail>,
    asked_for: Arc<Mutex<Vec<NaiveDateTime>>>,
}

impl FakeSource {
    fn typical() -> Self {
        Self {
            forecast: vec![
                ForecastRecord::new("TMN", "0600", "5.0"),
                ForecastRecord::new("TMN", "0900", "7.0"),
                ForecastRecord::new("TMX", "0900", "18.0"),
                ForecastRecord::new("TMX", "1500", "22.0"),
                ForecastRecord::new("POP", "0900", "40"),
                ForecastRecord::new("POP", "1200", "90"),
                ForecastRecord::new("POP", "1500", "90"),
                ForecastRecord::new("POP", "1800", "10"),
                ForecastRecord::new("SKY", "0900", "3"),
                ForecastRecord::new("PTY", "0900", "0"),
            ],
            air_quality: Some(AirQualityReading {
                pm10_grade: Some("2".to_string()),
                pm25_grade: Some("3".to_string()),
                overall_grade: Some("2".to_string()),
                pm10_value: Some("48".to_string()),
                pm25_value: Some("-".to_string()),
                ..Default::default()
            }),
            alerts: vec![
                AlertRecord {
                    t1: Some("Heavy rain warning".to_string()),
                    t2: Some("Heavy rain warning for Seoul".to_string()),
                    t4: Some("Up to 80mm".to_string()),
                    ..Default::default()
                },
                AlertRecord {
                    t1: Some("Strong wind advisory".to_string()),
                    t2: Some("Busan".to_string()),
                    ..Default::default()
                },
            ],
            fail: None,
            asked_for: Arc::default(),
        }
    }

    fn failing(fail: Fail) -> Self {
        Self {
            fail: Some(fail),
            ..Self::typical()
        }
    }
}

#[async_trait]
impl FetchSource for FakeSource {
    async fn forecast(&self, now: NaiveDateTime) -> weather_digest::Result<Vec<ForecastRecord>> {
        self.asked_for.lock().unwrap().push(now);
        match self.fail {
            Some(Fail::Forecast) => Err(DigestError::transport("connection reset")),
            _ => Ok(self.forecast.clone()),
        }
    }

    async fn air_quality(&self) -> weather_digest::Result<Option<AirQualityReading>> {
        match self.fail {
            Some(Fail::AirQuality) => Err(DigestError::transport("timeout")),
            _ => Ok(self.air_quality.clone()),
        }
    }

    async fn alerts(&self, now: NaiveDateTime) -> weather_digest::Result<Vec<AlertRecord>> {
        self.asked_for.lock().unwrap().push(now);
        match self.fail {
            Some(Fail::Alerts) => Err(DigestError::parse("unexpected body")),
            _ => Ok(self.alerts.clone()),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    reject: bool,
}

impl RecordingSink {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, destination: &str, text: &str) -> weather_digest::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        if self.reject {
            Err(DigestError::delivery("channel_not_found"))
        } else {
            Ok(())
        }
    }
}

fn settings() -> JobSettings {
    JobSettings {
        target_name: "Seoul".to_string(),
        destination: "#weather".to_string(),
        keywords: vec!["Seoul".to_string()],
        timezone: chrono_tz::Asia::Seoul,
    }
}

fn job(source: FakeSource, sink: &RecordingSink) -> DigestJob {
    DigestJob::new(Box::new(source), Box::new(sink.clone()), settings())
}

#[tokio::test]
async fn test_successful_run_delivers_once() {
    let sink = RecordingSink::default();
    let digest = job(FakeSource::typical(), &sink).run_once().await.unwrap();

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "#weather");
    assert_eq!(sent[0].1, digest);

    assert!(digest.starts_with("📅 Weather for Seoul ("));
    assert_eq!(digest.lines().nth(1), Some("⛅ Now: Mostly cloudy"));
    assert!(digest.contains("🌡️ Lowest: 7.0°C at 09:00"));
    assert!(digest.contains("🌡️ Highest: 22.0°C at 15:00"));
    assert!(digest.contains("1. 12:00 - 90%\n2. 15:00 - 90%\n3. 09:00 - 40%"));
    assert!(digest.contains("PM10: 😐 Moderate (48 µg/m³)"));
    assert!(digest.contains("PM2.5: 😷 Unhealthy\n"));
    assert!(digest.contains("- Heavy rain warning: Up to 80mm (Heavy rain warning for Seoul)"));
    assert!(!digest.contains("Strong wind"));
}

#[tokio::test]
async fn test_no_alert_section_without_matching_alerts() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source.alerts.remove(0);

    let digest = job(source, &sink).run_once().await.unwrap();
    assert!(!digest.contains("Weather alerts"));
    assert!(!digest.lines().any(|line| line.starts_with("- ")));
}

#[tokio::test]
async fn test_fetch_failures_abort_without_delivery() {
    for (fail, expected_kind) in [
        (Fail::Forecast, "transport"),
        (Fail::AirQuality, "transport"),
        (Fail::Alerts, "parse"),
    ] {
        let sink = RecordingSink::default();
        let err = job(FakeSource::failing(fail), &sink)
            .run_once()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), expected_kind);
        assert!(sink.sent.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_missing_air_quality_aborts() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source.air_quality = None;

    let err = job(source, &sink).run_once().await.unwrap_err();
    assert!(matches!(err, DigestError::MissingData { .. }));
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_probability_aborts() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source.forecast.push(ForecastRecord::new("POP", "2100", "n/a"));

    let err = job(source, &sink).run_once().await.unwrap_err();
    assert!(matches!(err, DigestError::Parse { .. }));
    assert!(err.to_string().contains("POP@2100"));
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_forecast_still_delivers() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source.forecast.clear();

    let digest = job(source, &sink).run_once().await.unwrap();
    assert!(digest.contains("🌡️ Lowest: n/a"));
    assert!(digest.contains("Rain chance: none forecast"));
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let sink = RecordingSink::rejecting();
    let err = job(FakeSource::typical(), &sink).run_once().await.unwrap_err();

    assert!(matches!(err, DigestError::Delivery { .. }));
    assert_eq!(sink.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preview_does_not_deliver() {
    let sink = RecordingSink::default();
    let digest = job(FakeSource::typical(), &sink).build_digest().await.unwrap();

    assert!(digest.contains("Air quality"));
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_instant_drives_source_and_title() {
    let sink = RecordingSink::default();
    let source = FakeSource::typical();
    let asked_for = source.asked_for.clone();
    let now = NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();

    let digest = job(source, &sink).build_digest_at(now).await.unwrap();

    assert!(digest.starts_with("📅 Weather for Seoul (2026-10-19)\n"));
    assert_eq!(*asked_for.lock().unwrap(), vec![now, now]);
}

#[tokio::test]
async fn test_condition_follows_run_time() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source.forecast.extend([
        ForecastRecord::new("SKY", "1500", "4"),
        ForecastRecord::new("PTY", "1500", "1"),
    ]);
    let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let morning = job(source.clone(), &sink)
        .build_digest_at(day.and_hms_opt(10, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(morning.lines().nth(1), Some("⛅ Now: Mostly cloudy"));

    let afternoon = job(source, &sink)
        .build_digest_at(day.and_hms_opt(16, 30, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(afternoon.lines().nth(1), Some("🌧 Now: Rain"));
}

#[tokio::test]
async fn test_no_condition_line_without_sky_codes() {
    let sink = RecordingSink::default();
    let mut source = FakeSource::typical();
    source
        .forecast
        .retain(|record| record.category.code() != "SKY" && record.category.code() != "PTY");

    let digest = job(source, &sink).build_digest().await.unwrap();
    assert!(digest.lines().nth(1).unwrap().starts_with("🌡️ Lowest"));
}
