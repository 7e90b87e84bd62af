use rust_decimal::Decimal;
use std::fmt;

/// Percentage change (exclusive) above which a stock is a buy, and below the negation of which
/// it is a sell.
pub const TREND_THRESHOLD_PCT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    pub fn from_percentage_change(change: Decimal) -> Self {
        let threshold = Decimal::from(TREND_THRESHOLD_PCT);
        if change > threshold {
            Self::Buy
        } else if change < -threshold {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        }
    }

    fn trend(self) -> &'static str {
        match self {
            Self::Buy => "positive",
            Self::Sell => "negative",
            Self::Hold => "neutral",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} trend)", self.label(), self.trend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(Recommendation::from_percentage_change(d("5")), Recommendation::Hold);
        assert_eq!(Recommendation::from_percentage_change(d("-5")), Recommendation::Hold);
        assert_eq!(Recommendation::from_percentage_change(d("5.0001")), Recommendation::Buy);
        assert_eq!(Recommendation::from_percentage_change(d("-5.0001")), Recommendation::Sell);
        assert_eq!(Recommendation::from_percentage_change(Decimal::ZERO), Recommendation::Hold);
    }

    #[test]
    fn renders_with_trend() {
        assert_eq!(Recommendation::Buy.to_string(), "Buy (positive trend)");
        assert_eq!(Recommendation::Sell.to_string(), "Sell (negative trend)");
        assert_eq!(Recommendation::Hold.to_string(), "Hold (neutral trend)");
        assert_eq!(Recommendation::Hold.label(), "Hold");
    }
}
