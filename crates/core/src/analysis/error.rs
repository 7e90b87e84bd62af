use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The first closing price is zero, so the relative change is undefined.
    ZeroBasePrice { symbol: String, date: NaiveDate },
    Overflow { symbol: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBasePrice { symbol, date } => write!(
                f,
                "cannot compute percentage change for {symbol}: closing price on {date} is zero"
            ),
            Self::Overflow { symbol } => {
                write!(f, "percentage change for {symbol} overflows decimal range")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}
