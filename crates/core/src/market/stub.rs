use crate::domain::{NewsList, PriceSeries};
use crate::market::MarketDataClient;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct StubSymbol {
    pub opening: PriceSeries,
    pub closing: PriceSeries,
    pub news: NewsList,
}

/// In-process provider with fixed data. Unknown symbols have no data.
#[derive(Debug, Clone, Default)]
pub struct StubMarketData {
    symbols: BTreeMap<String, StubSymbol>,
}

impl StubMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: &str, data: StubSymbol) -> Self {
        self.symbols.insert(symbol.to_ascii_uppercase(), data);
        self
    }

    /// Deterministic sample used for local runs: ten trading days for a few tickers.
    pub fn with_sample_data() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default();
        Self::new()
            .with_symbol(
                "DNA",
                sample_symbol(
                    start,
                    Decimal::new(150, 2),
                    Decimal::new(-3, 2),
                    vec![
                        "Ginkgo Bioworks announces new cell programming partnership".to_string(),
                        "Synthetic biology stocks slide as rates climb".to_string(),
                    ],
                ),
            )
            .with_symbol(
                "AAPL",
                sample_symbol(
                    start,
                    Decimal::new(18500, 2),
                    Decimal::new(125, 2),
                    vec!["Apple supplier outlook improves".to_string()],
                ),
            )
            .with_symbol(
                "MSFT",
                sample_symbol(start, Decimal::new(37000, 2), Decimal::new(10, 2), Vec::new()),
            )
    }

    fn get(&self, symbol: &str) -> Option<&StubSymbol> {
        self.symbols.get(&symbol.trim().to_ascii_uppercase())
    }
}

fn sample_symbol(start: NaiveDate, base: Decimal, step: Decimal, news: NewsList) -> StubSymbol {
    let mut opening = PriceSeries::new();
    let mut closing = PriceSeries::new();
    let mut close = base;
    for day in start.iter_days().take(10) {
        let open = close;
        close += step;
        opening.insert(day, open);
        closing.insert(day, close);
    }
    StubSymbol {
        opening,
        closing,
        news,
    }
}

#[async_trait::async_trait]
impl MarketDataClient for StubMarketData {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn opening_prices(&self, symbol: &str) -> Result<PriceSeries> {
        Ok(self.get(symbol).map(|s| s.opening.clone()).unwrap_or_default())
    }

    async fn closing_prices(&self, symbol: &str) -> Result<PriceSeries> {
        Ok(self.get(symbol).map(|s| s.closing.clone()).unwrap_or_default())
    }

    async fn news(&self, symbol: &str) -> Result<NewsList> {
        Ok(self.get(symbol).map(|s| s.news.clone()).unwrap_or_default())
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<String>> {
        let q = query.trim().to_ascii_uppercase();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .symbols
            .keys()
            .filter(|s| s.contains(&q))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_data_covers_dna() {
        let stub = StubMarketData::with_sample_data();
        let closes = stub.closing_prices("dna").await.unwrap();
        let opens = stub.opening_prices("DNA").await.unwrap();
        assert_eq!(closes.len(), 10);
        assert_eq!(opens.len(), 10);
        assert_eq!(stub.news("DNA").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_symbol_has_no_data() {
        let stub = StubMarketData::with_sample_data();
        assert!(stub.closing_prices("NOPE").await.unwrap().is_empty());
        assert!(stub.opening_prices("NOPE").await.unwrap().is_empty());
        assert!(stub.news("NOPE").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn searches_by_substring() {
        let stub = StubMarketData::with_sample_data();
        assert_eq!(stub.search_symbols("ms").await.unwrap(), vec!["MSFT".to_string()]);
        assert_eq!(
            stub.search_symbols("A").await.unwrap(),
            vec!["AAPL".to_string(), "DNA".to_string()]
        );
        assert!(stub.search_symbols(" ").await.unwrap().is_empty());
    }
}
