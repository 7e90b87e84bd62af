use crate::time::parse_iso_date;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

/// Body of `POST /api/stocks/analyze`, as sent by the web client. Every field may be missing or
/// `null`; validation happens in [`AnalyzeRequest::validate_and_into_params`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisParams {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub provider: DataProvider,
    pub interval: Interval,
}

impl AnalyzeRequest {
    pub fn validate_and_into_params(self) -> anyhow::Result<AnalysisParams> {
        // Only the first symbol is analyzed.
        let symbol = self
            .symbols
            .context("symbols is required")?
            .into_iter()
            .next()
            .context("symbols must contain at least one ticker")?
            .trim()
            .to_string();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");

        let raw_start = self.start_date.context("startDate is required")?;
        let start_date = parse_iso_date(&raw_start)
            .with_context(|| format!("invalid startDate: {raw_start:?}"))?;

        Ok(AnalysisParams {
            symbol,
            start_date,
            provider: DataProvider::parse_lossy(self.provider.as_deref().unwrap_or_default()),
            interval: Interval::parse_lossy(self.interval.as_deref().unwrap_or_default()),
        })
    }
}

/// Provider requested by the client. Accepted for compatibility; it does not select the
/// market-data backend and does not affect the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataProvider {
    AlphaVantage,
    Yahoo,
    Stub,
    Other(String),
}

impl DataProvider {
    pub fn parse_lossy(s: &str) -> Self {
        let t = s.trim();
        let normalized = t
            .to_ascii_lowercase()
            .replace(|c: char| c == '-' || c.is_whitespace(), "_");
        match normalized.as_str() {
            "alpha_vantage" | "alphavantage" => Self::AlphaVantage,
            "yahoo" | "yahoo_finance" => Self::Yahoo,
            "stub" => Self::Stub,
            _ => Self::Other(t.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlphaVantage => f.write_str("alpha_vantage"),
            Self::Yahoo => f.write_str("yahoo"),
            Self::Stub => f.write_str("stub"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Bar interval requested by the client. Accepted for compatibility; analysis always uses
/// daily bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Other(String),
}

impl Interval {
    pub fn parse_lossy(s: &str) -> Self {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "1d" | "daily" => Self::Daily,
            "1wk" | "1w" | "weekly" => Self::Weekly,
            "1mo" | "1m" | "monthly" => Self::Monthly,
            _ => Self::Other(t.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("1d"),
            Self::Weekly => f.write_str("1wk"),
            Self::Monthly => f.write_str("1mo"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(v: serde_json::Value) -> AnalyzeRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn uses_first_symbol_and_parses_start_date() {
        let params = request(json!({
            "symbols": [" DNA ", "AAPL"],
            "startDate": "2024-01-01",
            "provider": "x",
            "interval": "1d",
        }))
        .validate_and_into_params()
        .unwrap();

        assert_eq!(params.symbol, "DNA");
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(params.provider, DataProvider::Other("x".to_string()));
        assert_eq!(params.interval, Interval::Daily);
    }

    #[test]
    fn rejects_empty_symbol_list() {
        let res = request(json!({"symbols": [], "startDate": "2024-01-01"}))
            .validate_and_into_params();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_blank_symbol() {
        let res = request(json!({"symbols": ["  "], "startDate": "2024-01-01"}))
            .validate_and_into_params();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_unparsable_start_date() {
        let res = request(json!({"symbols": ["DNA"], "startDate": "01/02/2024"}))
            .validate_and_into_params();
        assert!(res.is_err());

        let res = request(json!({"symbols": ["DNA"]})).validate_and_into_params();
        assert!(res.is_err());
    }

    #[test]
    fn null_provider_and_interval_are_ignored() {
        let params = request(json!({
            "symbols": ["DNA"],
            "startDate": "2024-01-01",
            "provider": null,
            "interval": null,
        }))
        .validate_and_into_params()
        .unwrap();

        assert_eq!(params.symbol, "DNA");
        assert!(!params.provider.is_recognized());
        assert!(!params.interval.is_recognized());
    }

    #[test]
    fn null_symbols_or_start_date_fail_validation() {
        let res = request(json!({"symbols": null, "startDate": "2024-01-01"}))
            .validate_and_into_params();
        assert!(res.is_err());

        let res = request(json!({"symbols": ["DNA"], "startDate": null}))
            .validate_and_into_params();
        assert!(res.is_err());
    }

    #[test]
    fn recognizes_known_providers_and_intervals() {
        assert_eq!(DataProvider::parse_lossy("Alpha-Vantage"), DataProvider::AlphaVantage);
        assert_eq!(DataProvider::parse_lossy("yahoo"), DataProvider::Yahoo);
        assert!(!DataProvider::parse_lossy("").is_recognized());
        assert_eq!(Interval::parse_lossy("1wk"), Interval::Weekly);
        assert_eq!(Interval::parse_lossy("1MO"), Interval::Monthly);
        assert_eq!(Interval::parse_lossy("5m").to_string(), "5m");
    }
}
