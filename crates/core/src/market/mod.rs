use crate::config::Settings;
use crate::domain::{NewsList, PriceSeries};
use anyhow::Result;
use std::sync::Arc;

pub mod alpha_vantage;
pub mod stub;
pub mod types;

pub use alpha_vantage::AlphaVantageClient;
pub use stub::StubMarketData;

/// Read-only access to a market-data provider. Missing data is an empty series or list, not an
/// error.
#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn opening_prices(&self, symbol: &str) -> Result<PriceSeries>;

    async fn closing_prices(&self, symbol: &str) -> Result<PriceSeries>;

    async fn news(&self, symbol: &str) -> Result<NewsList>;

    async fn search_symbols(&self, query: &str) -> Result<Vec<String>>;
}

/// Which backend serves market data, from `MARKET_DATA_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    AlphaVantage,
    Stub,
}

impl Backend {
    pub fn parse(v: Option<&str>) -> Result<Self> {
        let Some(v) = v else {
            return Ok(Self::AlphaVantage);
        };
        match v.trim().to_ascii_lowercase().as_str() {
            "" | "alpha_vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            "stub" => Ok(Self::Stub),
            other => anyhow::bail!("unsupported MARKET_DATA_PROVIDER: {other}"),
        }
    }
}

pub fn from_settings(settings: &Settings) -> Result<Arc<dyn MarketDataClient>> {
    let backend = Backend::parse(settings.market_data_provider.as_deref())?;
    let client: Arc<dyn MarketDataClient> = match backend {
        Backend::AlphaVantage => Arc::new(AlphaVantageClient::from_settings(settings)?),
        Backend::Stub => Arc::new(StubMarketData::with_sample_data()),
    };
    tracing::info!(provider = client.provider_name(), "market data client ready");
    Ok(client)
}
