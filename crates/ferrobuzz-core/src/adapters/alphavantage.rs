use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{AlphaVantageConfig, ConfigError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::price_source::{DailyClosesRequest, PriceHistory, PriceSource, SourceError};
use crate::throttling::QuotaGuard;
use crate::{DailyClose, TradeDate};

/// Alpha Vantage `TIME_SERIES_DAILY` price source.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
    quota: QuotaGuard,
}

impl AlphaVantageAdapter {
    pub fn new(
        config: &AlphaVantageConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            http_client,
            api_key: config.require_api_key()?.to_owned(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout_ms: config.timeout_ms,
            quota: QuotaGuard::per_minute(config.requests_per_minute),
        })
    }

    fn endpoint(&self, req: &DailyClosesRequest) -> String {
        format!(
            "{}/query?function=TIME_SERIES_DAILY&symbol={}&outputsize={}&apikey={}",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            req.output_size.as_str(),
            urlencoding::encode(&self.api_key),
        )
    }

    async fn fetch_daily_closes(&self, req: &DailyClosesRequest) -> Result<PriceHistory, SourceError> {
        if let Err(wait) = self.quota.try_acquire() {
            return Err(SourceError::rate_limited(format!(
                "alphavantage request quota exhausted; next slot in {:.1}s",
                wait.as_secs_f64()
            )));
        }

        info!(
            symbol = %req.symbol,
            output_size = req.output_size.as_str(),
            "requesting alphavantage daily series"
        );

        let request = HttpRequest::get(self.endpoint(req))
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("alphavantage transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        let payload: DailySeriesResponse = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse alphavantage response: {e}"))
        })?;

        let closes = payload.into_closes(req)?;
        debug!(symbol = %req.symbol, days = closes.len(), "parsed alphavantage daily series");
        Ok(PriceHistory::new(req.symbol.clone(), closes))
    }
}

impl PriceSource for AlphaVantageAdapter {
    fn id(&self) -> &'static str {
        "alphavantage"
    }

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_daily_closes(&req).await })
    }
}

impl std::fmt::Debug for AlphaVantageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageAdapter")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

/// Alpha Vantage answers errors and throttling with HTTP 200 and a
/// top-level message key instead of the series.
#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: Option<BTreeMap<String, DailyBarPayload>>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBarPayload {
    #[serde(rename = "4. close")]
    close: String,
}

impl DailySeriesResponse {
    fn into_closes(self, req: &DailyClosesRequest) -> Result<Vec<DailyClose>, SourceError> {
        if let Some(message) = self.error_message {
            return Err(SourceError::invalid_request(format!(
                "alphavantage rejected {}: {message}",
                req.symbol
            )));
        }
        if let Some(message) = self.note.or(self.information) {
            return Err(SourceError::rate_limited(format!("alphavantage: {message}")));
        }

        let series = self
            .series
            .filter(|series| !series.is_empty())
            .ok_or_else(|| {
                SourceError::missing_data(format!("alphavantage returned no daily series for {}", req.symbol))
            })?;

        series
            .into_iter()
            .map(|(day, bar)| {
                let date = TradeDate::parse(&day)
                    .map_err(|e| SourceError::internal(format!("alphavantage: {e}")))?;
                let close = bar.close.trim().parse::<f64>().map_err(|_| {
                    SourceError::internal(format!(
                        "alphavantage close '{}' on {date} is not a number",
                        bar.close
                    ))
                })?;
                Ok(DailyClose::new(date, close))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::price_source::{OutputSize, SourceErrorKind};
    use crate::Symbol;
    use std::sync::Mutex;

    const DAILY_BODY: &str = r#"{
        "Meta Data": {"2. Symbol": "GME"},
        "Time Series (Daily)": {
            "2021-01-29": {"1. open": "379.71", "4. close": "325.0000", "5. volume": "50566055"},
            "2021-01-28": {"1. open": "265.00", "4. close": "193.6000", "5. volume": "58815805"},
            "2021-01-27": {"1. open": "354.83", "4. close": "347.5100", "5. volume": "93396666"}
        }
    }"#;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn returning(body: &str) -> Self {
            Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn config() -> AlphaVantageConfig {
        AlphaVantageConfig {
            api_key: Some(String::from("alpha-key")),
            base_url: String::from("https://av.example.test/"),
            ..AlphaVantageConfig::default()
        }
    }

    fn request() -> DailyClosesRequest {
        DailyClosesRequest::new(Symbol::parse("GME").expect("valid symbol"))
            .with_output_size(OutputSize::Compact)
    }

    #[tokio::test]
    async fn builds_daily_series_url_with_api_key() {
        let client = Arc::new(RecordingHttpClient::returning(DAILY_BODY));
        let adapter = AlphaVantageAdapter::new(&config(), client.clone()).expect("key configured");

        adapter.daily_closes(request()).await.expect("should parse");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://av.example.test/query?function=TIME_SERIES_DAILY&symbol=GME&outputsize=compact&apikey=alpha-key"
        );
    }

    #[tokio::test]
    async fn parses_string_closes_oldest_first() {
        let client = Arc::new(RecordingHttpClient::returning(DAILY_BODY));
        let adapter = AlphaVantageAdapter::new(&config(), client).expect("key configured");

        let history = adapter.daily_closes(request()).await.expect("should parse");
        let closes = history.closes.iter().map(|c| c.close).collect::<Vec<_>>();
        assert_eq!(closes, vec![347.51, 193.6, 325.0]);
        assert_eq!(history.first_date().map(|d| d.to_string()).as_deref(), Some("2021-01-27"));
    }

    #[tokio::test]
    async fn maps_upstream_messages_to_error_kinds() {
        let cases = [
            (r#"{"Error Message": "Invalid API call."}"#, SourceErrorKind::InvalidRequest),
            (r#"{"Note": "Thank you for using Alpha Vantage!"}"#, SourceErrorKind::RateLimited),
            (r#"{"Information": "rate limit"}"#, SourceErrorKind::RateLimited),
            (r#"{"Meta Data": {}}"#, SourceErrorKind::MissingData),
            ("not json", SourceErrorKind::Internal),
        ];

        for (body, kind) in cases {
            let client = Arc::new(RecordingHttpClient::returning(body));
            let adapter = AlphaVantageAdapter::new(&config(), client).expect("key configured");
            let error = adapter.daily_closes(request()).await.expect_err("must fail");
            assert_eq!(error.kind(), kind, "body: {body}");
        }
    }

    #[tokio::test]
    async fn transport_failures_are_unavailable() {
        let client = Arc::new(RecordingHttpClient {
            response: Err(HttpError::new("connection refused")),
            requests: Mutex::new(Vec::new()),
        });
        let adapter = AlphaVantageAdapter::new(&config(), client).expect("key configured");

        let error = adapter.daily_closes(request()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(!error.message().contains("alpha-key"));
    }

    #[tokio::test]
    async fn fails_fast_when_quota_is_spent() {
        let client = Arc::new(RecordingHttpClient::returning(DAILY_BODY));
        let adapter = AlphaVantageAdapter::new(
            &AlphaVantageConfig {
                requests_per_minute: 1,
                ..config()
            },
            client.clone(),
        )
        .expect("key configured");

        adapter.daily_closes(request()).await.expect("first call fits the quota");
        let error = adapter.daily_closes(request()).await.expect_err("second call must fail");

        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let client = Arc::new(RecordingHttpClient::returning(DAILY_BODY));
        let err = AlphaVantageAdapter::new(&AlphaVantageConfig::default(), client)
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingApiKey));
    }
}
