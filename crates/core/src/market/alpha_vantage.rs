use crate::config::Settings;
use crate::domain::{NewsList, PriceSeries};
use crate::market::types::{DailySeriesResponse, NewsResponse, SymbolSearchResponse};
use crate::market::MarketDataClient;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
// One attempt means no retry.
const DEFAULT_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceField {
    Open,
    Close,
}

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    attempts: u32,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_market_data_api_key()?.to_string();
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = settings
            .market_data_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = Duration::from_secs(timeout_secs);
        let attempts = settings.market_data_attempts.unwrap_or(DEFAULT_ATTEMPTS);

        Self::new(base_url, api_key, timeout, attempts)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        attempts: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            attempts: attempts.max(1),
        })
    }

    async fn query_once(&self, params: &[(&str, &str)]) -> Result<Value> {
        let res = self
            .http
            .get(self.base_url.as_str())
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            // The URL carries the API key.
            .map_err(|e| e.without_url())
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("failed to read market data response")?;

        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        let raw = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("market data response is not valid JSON: {text}"))?;
        check_provider_error(&raw)?;
        Ok(raw)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(("function", function));
        all_params.extend_from_slice(params);

        let mut attempt: u32 = 0;
        let raw = loop {
            attempt += 1;
            match self.query_once(&all_params).await {
                Ok(raw) => break raw,
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err(err).with_context(|| format!("{function} failed"));
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(
                        attempt,
                        ?backoff,
                        function,
                        error = %err,
                        "market data fetch failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        };

        serde_json::from_value::<T>(raw)
            .with_context(|| format!("failed to parse {function} response"))
    }

    async fn daily_prices(&self, symbol: &str, field: PriceField) -> Result<PriceSeries> {
        let resp: DailySeriesResponse = self
            .query("TIME_SERIES_DAILY", &[("symbol", symbol)])
            .await?;
        let series = parse_daily_series(&resp, field)?;
        tracing::debug!(symbol, ?field, points = series.len(), "fetched daily prices");
        Ok(series)
    }
}

#[async_trait::async_trait]
impl MarketDataClient for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn opening_prices(&self, symbol: &str) -> Result<PriceSeries> {
        self.daily_prices(symbol, PriceField::Open).await
    }

    async fn closing_prices(&self, symbol: &str) -> Result<PriceSeries> {
        self.daily_prices(symbol, PriceField::Close).await
    }

    async fn news(&self, symbol: &str) -> Result<NewsList> {
        let resp: NewsResponse = self
            .query("NEWS_SENTIMENT", &[("tickers", symbol)])
            .await?;
        Ok(headlines(resp))
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<String>> {
        let resp: SymbolSearchResponse = self
            .query("SYMBOL_SEARCH", &[("keywords", query)])
            .await?;
        Ok(matched_symbols(resp))
    }
}

/// The provider answers throttled or invalid calls with HTTP 200 and one of these keys.
fn check_provider_error(raw: &Value) -> Result<()> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(msg) = raw.get(key) {
            let msg = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
            anyhow::bail!("market data provider error ({key}): {msg}");
        }
    }
    Ok(())
}

fn parse_daily_series(resp: &DailySeriesResponse, field: PriceField) -> Result<PriceSeries> {
    let mut out = PriceSeries::new();
    for (date, bar) in &resp.series {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid trading date in daily series: {date}"))?;
        let raw = match field {
            PriceField::Open => &bar.open,
            PriceField::Close => &bar.close,
        };
        let price = parse_price(raw).with_context(|| format!("invalid price on {date}"))?;
        out.insert(date, price);
    }
    Ok(out)
}

fn parse_price(s: &str) -> Result<Decimal> {
    let t = s.trim();
    anyhow::ensure!(!t.is_empty(), "price is empty");
    t.parse::<Decimal>()
        .with_context(|| format!("price is not a decimal: {t}"))
}

fn headlines(resp: NewsResponse) -> NewsList {
    resp.feed
        .into_iter()
        .map(|a| a.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn matched_symbols(resp: SymbolSearchResponse) -> Vec<String> {
    resp.best_matches
        .into_iter()
        .map(|m| m.symbol.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
