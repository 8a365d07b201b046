//! Public data portal client
//!
//! Retrieves the village forecast, real-time air quality and weather alert
//! bulletins from `apis.data.go.kr`. Each call is a single attempt; failures
//! are mapped onto the digest error taxonomy and left to the caller.

use super::FetchSource;
use super::grid::GridPoint;
use crate::Result;
use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::models::{AirQualityReading, AlertRecord, ForecastRecord};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const FORECAST_PATH: &str = "1360000/VilageFcstInfoService_2.0/getVilageFcst";
const AIR_QUALITY_PATH: &str = "B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";
const ALERT_PATH: &str = "1360000/WthrWrnInfoService/getWthrWrnMsg";

/// Daily release carrying the whole day's TMN/TMX
const DAILY_BASE_TIME: &str = "0200";
const FALLBACK_BASE_TIME: &str = "2300";
/// Releases become available ten minutes after the slot
const RELEASE_DELAY_MINUTES: u32 = 10;

/// Pick the village forecast release to query at `now` (local time).
///
/// Uses today's 02:00 release once it is published, otherwise the previous
/// day's 23:00 release.
#[must_use]
pub fn base_date_time(now: NaiveDateTime) -> (NaiveDate, &'static str) {
    let published = NaiveTime::from_hms_opt(2, RELEASE_DELAY_MINUTES, 0).unwrap_or_default();
    if now.time() >= published {
        (now.date(), DAILY_BASE_TIME)
    } else {
        (now.date() - ChronoDuration::days(1), FALLBACK_BASE_TIME)
    }
}

/// HTTP client for the data portal APIs
pub struct PublicDataClient {
    client: Client,
    base_url: String,
    service_key: String,
    grid: GridPoint,
    station_name: String,
    alert_station_id: Option<String>,
}

impl PublicDataClient {
    /// Create a new client from the digest configuration
    pub fn new(config: &DigestConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DigestError::config(format!("Failed to create HTTP client: {e}")))?;

        let service_key = config
            .api
            .service_key
            .clone()
            .ok_or_else(|| DigestError::config("Missing data portal service key"))?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            service_key,
            grid: config.grid()?,
            station_name: config.target.station_name.clone(),
            alert_station_id: config.alerts.station_id.clone(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}?serviceKey={}",
            self.base_url,
            path,
            urlencoding::encode(&self.service_key)
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Send a GET request and decode the JSON body
    #[instrument(skip(self, url))]
    async fn get_json<T: DeserializeOwned>(&self, api: &str, url: &str) -> Result<T> {
        let request_start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error calling {} API: {}", api, e);
            DigestError::transport(format!("{api} request failed: {e}"))
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            request_start.elapsed().as_secs_f64()
        );

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("{} API rejected the service key (HTTP {})", api, status.as_u16());
            return Err(DigestError::transport(format!(
                "{api} API rejected the service key (HTTP {})",
                status.as_u16()
            )));
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("{} API rate limit exceeded", api);
            return Err(DigestError::transport(format!(
                "{api} API rate limit exceeded"
            )));
        } else if !status.is_success() {
            return Err(DigestError::transport(format!(
                "{api} API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DigestError::transport(format!("{api} response body unreadable: {e}")))?;

        let parse_start = Instant::now();
        let decoded = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", api, e);
            DigestError::parse(format!("invalid {api} response: {e}"))
        })?;

        let total_duration = request_start.elapsed();
        info!(
            "Retrieved {} data in {:.3}s (parse: {:.3}s)",
            api,
            total_duration.as_secs_f64(),
            parse_start.elapsed().as_secs_f64()
        );

        if total_duration.as_secs() > 5 {
            warn!("Slow {} API response: {:.3}s", api, total_duration.as_secs_f64());
        }

        Ok(decoded)
    }
}

#[async_trait]
impl FetchSource for PublicDataClient {
    async fn forecast(&self, now: NaiveDateTime) -> Result<Vec<ForecastRecord>> {
        let (base_date, base_time) = base_date_time(now);
        let today = now.date().format("%Y%m%d").to_string();

        debug!(
            "Requesting village forecast for grid ({}, {}) base {} {}",
            self.grid.nx,
            self.grid.ny,
            base_date.format("%Y%m%d"),
            base_time
        );

        let url = self.url(
            FORECAST_PATH,
            &[
                ("pageNo", "1".to_string()),
                ("numOfRows", "1000".to_string()),
                ("dataType", "JSON".to_string()),
                ("base_date", base_date.format("%Y%m%d").to_string()),
                ("base_time", base_time.to_string()),
                ("nx", self.grid.nx.to_string()),
                ("ny", self.grid.ny.to_string()),
            ],
        );

        let envelope: wire::Envelope<wire::KmaBody<wire::ForecastItem>> =
            self.get_json("forecast", &url).await?;

        let items = match envelope.response.status("forecast")? {
            wire::ResultStatus::NoData => Vec::new(),
            wire::ResultStatus::Normal => envelope.response.into_items(),
        };

        if items.is_empty() {
            return Err(DigestError::empty_result(format!(
                "forecast API returned no records for grid ({}, {})",
                self.grid.nx, self.grid.ny
            )));
        }

        let records = wire::todays_records(items, &today);
        if records.is_empty() {
            return Err(DigestError::empty_result(format!(
                "forecast API returned no records for {today}"
            )));
        }

        info!("Fetched {} forecast records for {}", records.len(), today);
        Ok(records)
    }

    async fn air_quality(&self) -> Result<Option<AirQualityReading>> {
        let url = self.url(
            AIR_QUALITY_PATH,
            &[
                ("returnType", "json".to_string()),
                ("numOfRows", "1".to_string()),
                ("pageNo", "1".to_string()),
                ("stationName", self.station_name.clone()),
                ("dataTerm", "DAILY".to_string()),
                ("ver", "1.3".to_string()),
            ],
        );

        let envelope: wire::Envelope<wire::AirBody> = self.get_json("air quality", &url).await?;

        if let wire::ResultStatus::NoData = envelope.response.status("air quality")? {
            return Ok(None);
        }

        let reading = envelope
            .response
            .body
            .and_then(|body| body.items.into_iter().next())
            .map(|item| item.into_reading(&self.station_name));

        match &reading {
            Some(reading) => debug!(
                "Air quality at {} ({}): PM10 {} / PM2.5 {}",
                self.station_name,
                reading.measured_at.as_deref().unwrap_or("-"),
                reading.pm10_value.as_deref().unwrap_or("-"),
                reading.pm25_value.as_deref().unwrap_or("-")
            ),
            None => warn!("No air-quality measurement for station {}", self.station_name),
        }

        Ok(reading)
    }

    async fn alerts(&self, now: NaiveDateTime) -> Result<Vec<AlertRecord>> {
        let today = now.date();
        let from = today - ChronoDuration::days(1);

        let mut params = vec![
            ("pageNo", "1".to_string()),
            ("numOfRows", "100".to_string()),
            ("dataType", "JSON".to_string()),
            ("fromTmFc", from.format("%Y%m%d").to_string()),
            ("toTmFc", today.format("%Y%m%d").to_string()),
        ];
        if let Some(station_id) = &self.alert_station_id {
            params.push(("stnId", station_id.clone()));
        }
        let url = self.url(ALERT_PATH, &params);

        let envelope: wire::Envelope<wire::KmaBody<AlertRecord>> =
            self.get_json("alerts", &url).await?;

        let alerts = match envelope.response.status("alerts")? {
            wire::ResultStatus::NoData => Vec::new(),
            wire::ResultStatus::Normal => envelope.response.into_items(),
        };

        info!("Fetched {} alert bulletins", alerts.len());
        Ok(alerts)
    }
}

/// Data portal response structures and conversion utilities
mod wire {
    use crate::Result;
    use crate::error::DigestError;
    use crate::models::{AirQualityReading, ForecastRecord};
    use serde::Deserialize;

    const NORMAL: &str = "00";
    const NO_DATA: &str = "03";

    #[derive(Debug, Deserialize)]
    pub struct Envelope<B> {
        pub response: Response<B>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Response<B> {
        pub header: Header,
        pub body: Option<B>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Header {
        #[serde(rename = "resultCode")]
        pub result_code: String,
        #[serde(rename = "resultMsg", default)]
        pub result_msg: String,
    }

    pub enum ResultStatus {
        Normal,
        NoData,
    }

    impl<B> Response<B> {
        pub fn status(&self, api: &str) -> Result<ResultStatus> {
            match self.header.result_code.as_str() {
                NORMAL => Ok(ResultStatus::Normal),
                NO_DATA => Ok(ResultStatus::NoData),
                code => Err(DigestError::transport(format!(
                    "{api} API returned error {code}: {}",
                    self.header.result_msg
                ))),
            }
        }
    }

    impl<T> Response<KmaBody<T>> {
        pub fn into_items(self) -> Vec<T> {
            self.body
                .and_then(|body| body.items)
                .map(|items| items.item)
                .unwrap_or_default()
        }
    }

    /// KMA services wrap records as `body.items.item[]`
    #[derive(Debug, Deserialize)]
    pub struct KmaBody<T> {
        pub items: Option<KmaItems<T>>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    pub struct KmaItems<T> {
        #[serde(default)]
        pub item: Vec<T>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub category: String,
        #[serde(rename = "fcstDate")]
        pub fcst_date: String,
        #[serde(rename = "fcstTime")]
        pub fcst_time: String,
        #[serde(rename = "fcstValue")]
        pub fcst_value: String,
    }

    /// Keep only the records forecast for `date` (YYYYMMDD), in feed order
    pub fn todays_records(items: Vec<ForecastItem>, date: &str) -> Vec<ForecastRecord> {
        items
            .into_iter()
            .filter(|item| item.fcst_date == date)
            .map(|item| ForecastRecord::new(item.category, item.fcst_time, item.fcst_value))
            .collect()
    }

    /// AirKorea wraps records as `body.items[]`
    #[derive(Debug, Deserialize)]
    pub struct AirBody {
        #[serde(default)]
        pub items: Vec<AirItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirItem {
        #[serde(rename = "pm10Grade")]
        pub pm10_grade: Option<String>,
        #[serde(rename = "pm25Grade")]
        pub pm25_grade: Option<String>,
        #[serde(rename = "khaiGrade")]
        pub khai_grade: Option<String>,
        #[serde(rename = "dataTime")]
        pub data_time: Option<String>,
        #[serde(rename = "pm10Value")]
        pub pm10_value: Option<String>,
        #[serde(rename = "pm25Value")]
        pub pm25_value: Option<String>,
    }

    impl AirItem {
        pub fn into_reading(self, station_name: &str) -> AirQualityReading {
            AirQualityReading {
                pm10_grade: self.pm10_grade,
                pm25_grade: self.pm25_grade,
                overall_grade: self.khai_grade,
                station_name: Some(station_name.to_string()),
                measured_at: self.data_time,
                pm10_value: self.pm10_value,
                pm25_value: self.pm25_value,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::models::{AlertRecord, ForecastCategory};

        #[test]
        fn test_forecast_response_decoding() {
            let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
                "body":{"dataType":"JSON","items":{"item":[
                    {"baseDate":"20261019","baseTime":"0200","category":"TMN","fcstDate":"20261019","fcstTime":"0600","fcstValue":"5.0","nx":60,"ny":127},
                    {"baseDate":"20261019","baseTime":"0200","category":"POP","fcstDate":"20261019","fcstTime":"0900","fcstValue":"30","nx":60,"ny":127},
                    {"baseDate":"20261019","baseTime":"0200","category":"TMN","fcstDate":"20261020","fcstTime":"0600","fcstValue":"3.0","nx":60,"ny":127}
                ]},"pageNo":1,"numOfRows":1000,"totalCount":3}}}"#;

            let envelope: Envelope<KmaBody<ForecastItem>> = serde_json::from_str(json).unwrap();
            assert!(matches!(
                envelope.response.status("forecast").unwrap(),
                ResultStatus::Normal
            ));

            let records = todays_records(envelope.response.into_items(), "20261019");
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].category, ForecastCategory::Tmn);
            assert_eq!(records[0].time, "0600");
            assert_eq!(records[1].value, "30");
        }

        #[test]
        fn test_items_without_item_list() {
            let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
                "body":{"dataType":"JSON","items":{},"totalCount":0}}}"#;
            let envelope: Envelope<KmaBody<ForecastItem>> = serde_json::from_str(json).unwrap();
            assert!(envelope.response.into_items().is_empty());
        }

        #[test]
        fn test_no_data_header() {
            let json = r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#;
            let envelope: Envelope<KmaBody<AlertRecord>> = serde_json::from_str(json).unwrap();
            assert!(matches!(
                envelope.response.status("alerts").unwrap(),
                ResultStatus::NoData
            ));
            assert!(envelope.response.into_items().is_empty());
        }

        #[test]
        fn test_error_header_is_transport_error() {
            let json = r#"{"response":{"header":{"resultCode":"30","resultMsg":"SERVICE_KEY_IS_NOT_REGISTERED_ERROR"}}}"#;
            let envelope: Envelope<AirBody> = serde_json::from_str(json).unwrap();
            let err = envelope.response.status("air quality").err().unwrap();
            assert!(matches!(err, DigestError::Transport { .. }));
            assert!(err.to_string().contains("SERVICE_KEY_IS_NOT_REGISTERED_ERROR"));
        }

        #[test]
        fn test_air_quality_decoding_with_nulls() {
            let json = r#"{"response":{"body":{"totalCount":24,"items":[
                {"pm10Grade":"2","pm25Grade":null,"khaiGrade":"2","dataTime":"2026-10-19 07:00","pm10Value":"45","pm25Value":"-"}
            ],"pageNo":1,"numOfRows":1},"header":{"resultMsg":"NORMAL_CODE","resultCode":"00"}}}"#;

            let envelope: Envelope<AirBody> = serde_json::from_str(json).unwrap();
            let reading = envelope
                .response
                .body
                .unwrap()
                .items
                .into_iter()
                .next()
                .unwrap()
                .into_reading("종로구");

            assert_eq!(reading.pm10_grade.as_deref(), Some("2"));
            assert_eq!(reading.pm25_grade, None);
            assert_eq!(reading.overall_grade.as_deref(), Some("2"));
            assert_eq!(reading.station_name.as_deref(), Some("종로구"));
        }

        #[test]
        fn test_alert_decoding() {
            let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
                "body":{"items":{"item":[
                    {"stnId":"108","tmFc":202610190500,"tmSeq":1,"t1":"o 호우주의보","t2":"서울특별시","t4":"시간당 30mm"}
                ]}}}}"#;
            let envelope: Envelope<KmaBody<AlertRecord>> = serde_json::from_str(json).unwrap();
            let alerts = envelope.response.into_items();
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].region(), "서울특별시");
            assert_eq!(alerts[0].t3, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: (i32, u32, u32), time: (u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, 0)
            .unwrap()
    }

    #[test]
    fn test_base_time_after_daily_release() {
        let (date, time) = base_date_time(at((2026, 10, 19), (7, 0)));
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(time, "0200");

        let (_, time) = base_date_time(at((2026, 10, 19), (2, 10)));
        assert_eq!(time, "0200");
    }

    #[test]
    fn test_base_time_before_daily_release() {
        let (date, time) = base_date_time(at((2026, 1, 1), (2, 9)));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(time, "2300");
    }

    #[test]
    fn test_url_encodes_key_and_params() {
        let mut config = DigestConfig::default();
        config.api.service_key = Some("abc+def/ghi==0123456".to_string());
        config.target.nx = Some(60);
        config.target.ny = Some(127);

        let client = PublicDataClient::new(&config).unwrap();
        let url = client.url(AIR_QUALITY_PATH, &[("stationName", "종로구".to_string())]);

        assert!(url.starts_with(
            "https://apis.data.go.kr/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty?serviceKey=abc%2Bdef%2Fghi%3D%3D0123456"
        ));
        assert!(url.ends_with("&stationName=%EC%A2%85%EB%A1%9C%EA%B5%AC"));
    }
}
