//! Current-price lookup against a public ticker endpoint.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::Price;

/// Failure while fetching or decoding the ticker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("ticker transport error: {0}")]
    Transport(#[from] HttpError),
    #[error("ticker returned status {status}")]
    Status { status: u16 },
    #[error("ticker reported errors: {}", .0.join("; "))]
    Upstream(Vec<String>),
    #[error("could not parse ticker response: {0}")]
    Malformed(String),
}

/// Source of the current reference price.
pub trait PriceSource: Send + Sync {
    fn fetch_price<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Price, FetchError>> + Send + 'a>>;
}

/// Kraken public `Ticker` endpoint, reading the best ask of one pair.
#[derive(Clone)]
pub struct KrakenTicker {
    http_client: Arc<dyn HttpClient>,
    url: String,
    pair_key: String,
    timeout_ms: u64,
}

impl KrakenTicker {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        url: impl Into<String>,
        pair_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            url: url.into(),
            pair_key: pair_key.into(),
            timeout_ms: 3_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn pair_key(&self) -> &str {
        &self.pair_key
    }
}

#[derive(Debug, Deserialize)]
struct TickerEnvelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<Value>,
}

/// Extract `result.<pair_key>.a[0]` from a ticker body.
pub fn parse_ask_price(body: &str, pair_key: &str) -> Result<Price, FetchError> {
    let envelope: TickerEnvelope = serde_json::from_str(body)
        .map_err(|error| FetchError::Malformed(format!("invalid json: {error}")))?;

    if !envelope.error.is_empty() {
        return Err(FetchError::Upstream(envelope.error));
    }

    let raw = envelope
        .result
        .as_ref()
        .and_then(|result| result.get(pair_key))
        .and_then(|pair| pair.get("a"))
        .and_then(|ask| ask.get(0))
        .ok_or_else(|| FetchError::Malformed(format!("missing result.{pair_key}.a[0]")))?;

    let value = match raw {
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            FetchError::Malformed(format!("ask price '{text}' is not a number"))
        })?,
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| FetchError::Malformed(format!("ask price {number} is out of range")))?,
        other => {
            return Err(FetchError::Malformed(format!(
                "ask price has unexpected type: {other}"
            )))
        }
    };

    Price::new(value).map_err(|error| FetchError::Malformed(error.to_string()))
}

impl PriceSource for KrakenTicker {
    fn fetch_price<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Price, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            debug!(url = %self.url, pair = %self.pair_key, "fetching ticker");
            let request = HttpRequest::get(&self.url).with_timeout_ms(self.timeout_ms);
            let response = self.http_client.execute(request).await?;

            if !response.is_success() {
                return Err(FetchError::Status {
                    status: response.status,
                });
            }

            let price = parse_ask_price(&response.body, &self.pair_key)?;
            info!(pair = %self.pair_key, price = price.value(), "fetched ask price");
            Ok(price)
        })
    }
}

/// Fixed price source for dry runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticPrice(pub Price);

impl PriceSource for StaticPrice {
    fn fetch_price<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Price, FetchError>> + Send + 'a>> {
        let price = self.0;
        Box::pin(async move { Ok(price) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpErrorKind, HttpMethod, HttpResponse};
    use std::sync::Mutex;

    const KRAKEN_BODY: &str = r#"{
        "error": [],
        "result": {
            "XXBTZEUR": {
                "a": ["40251.10000", "1", "1.000"],
                "b": ["40250.90000", "2", "2.000"]
            }
        }
    }"#;

    #[derive(Debug)]
    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for CannedHttpClient {
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

    fn ticker(response: Result<HttpResponse, HttpError>) -> (KrakenTicker, Arc<CannedHttpClient>) {
        let client = Arc::new(CannedHttpClient::new(response));
        let ticker = KrakenTicker::new(client.clone(), "https://api.test/Ticker?pair=XBTEUR", "XXBTZEUR")
            .with_timeout_ms(1_500);
        (ticker, client)
    }

    #[test]
    fn parses_first_ask_entry() {
        let price = parse_ask_price(KRAKEN_BODY, "XXBTZEUR").expect("ask should parse");
        assert_eq!(price.value(), 40_251.1);
    }

    #[test]
    fn missing_pair_is_malformed() {
        let error = parse_ask_price(KRAKEN_BODY, "XETHZEUR").expect_err("pair is absent");
        assert!(matches!(error, FetchError::Malformed(message) if message.contains("XETHZEUR")));
    }

    #[test]
    fn empty_ask_array_is_malformed() {
        let body = r#"{"error":[],"result":{"XXBTZEUR":{"a":[]}}}"#;
        let error = parse_ask_price(body, "XXBTZEUR").expect_err("no ask entry");
        assert!(matches!(error, FetchError::Malformed(_)));
    }

    #[test]
    fn upstream_errors_are_surfaced() {
        let body = r#"{"error":["EQuery:Unknown asset pair"]}"#;
        let error = parse_ask_price(body, "XXBTZEUR").expect_err("upstream error");
        assert_eq!(
            error,
            FetchError::Upstream(vec![String::from("EQuery:Unknown asset pair")])
        );
    }

    #[tokio::test]
    async fn fetch_issues_get_with_configured_timeout() {
        let (ticker, client) = ticker(Ok(HttpResponse::ok_json(KRAKEN_BODY)));

        let price = ticker.fetch_price().await.expect("fetch should succeed");
        assert_eq!(price.value(), 40_251.1);

        let requests = client.requests.lock().expect("not poisoned");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "https://api.test/Ticker?pair=XBTEUR");
        assert_eq!(requests[0].timeout_ms, 1_500);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (ticker, _) = ticker(Ok(HttpResponse::with_status(503, "unavailable")));
        let error = ticker.fetch_price().await.expect_err("must fail");
        assert_eq!(error, FetchError::Status { status: 503 });
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let (ticker, _) = ticker(Err(HttpError::new(HttpErrorKind::Connect, "refused")));
        let error = ticker.fetch_price().await.expect_err("must fail");
        assert!(matches!(error, FetchError::Transport(inner) if inner.kind() == HttpErrorKind::Connect));
    }
}
