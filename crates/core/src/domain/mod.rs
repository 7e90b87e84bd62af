use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub mod contract;
pub mod recommendation;

/// Daily prices keyed by trading date. Iteration is chronological.
pub type PriceSeries = BTreeMap<NaiveDate, Decimal>;

/// Headlines in the order the provider returned them.
pub type NewsList = Vec<String>;
