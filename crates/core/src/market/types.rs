use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    pub series: BTreeMap<String, DailyBar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "1. open", default)]
    pub open: String,
    #[serde(rename = "4. close", default)]
    pub close: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub feed: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Vec<SymbolMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolMatch {
    #[serde(rename = "1. symbol", default)]
    pub symbol: String,
}
