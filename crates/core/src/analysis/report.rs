use crate::domain::recommendation::Recommendation;
use crate::domain::{NewsList, PriceSeries};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

pub const NO_NEWS_LINE: &str = "No news available for this stock.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opening_prices: PriceSeries,
    pub closing_prices: PriceSeries,
    pub percentage_change: Decimal,
    pub recommendation: Recommendation,
    pub highest_close: Option<PricePoint>,
    pub lowest_close: Option<PricePoint>,
    pub news: NewsList,
}

impl AnalysisReport {
    /// Percentage change at two decimal places, half-up.
    pub fn rounded_percentage_change(&self) -> Decimal {
        let rounded = self
            .percentage_change
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        // Avoid rendering "-0.00".
        if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stock Analysis Summary:")?;
        writeln!(f, "Stock Symbol: {}", self.symbol)?;
        writeln!(f, "Start Date: {}", self.start_date)?;
        writeln!(f, "End Date: {}", self.end_date)?;
        writeln!(f, "Daily Opening and Closing Prices:")?;
        for (date, close) in &self.closing_prices {
            let open = self
                .opening_prices
                .get(date)
                .copied()
                .unwrap_or(Decimal::ZERO);
            writeln!(
                f,
                "Date: {date} | Opening Price: {open} | Closing Price: {close}"
            )?;
        }

        writeln!(
            f,
            "Percentage Change Over Period: {:.2}%",
            self.rounded_percentage_change()
        )?;
        writeln!(f, "Recommendation: {}", self.recommendation)?;
        write_extreme(f, "Highest", self.highest_close)?;
        write_extreme(f, "Lowest", self.lowest_close)?;

        writeln!(f)?;
        writeln!(f, "Latest News Articles:")?;
        if self.news.is_empty() {
            writeln!(f, "{NO_NEWS_LINE}")?;
        } else {
            for headline in &self.news {
                writeln!(f, "- {headline}")?;
            }
        }
        Ok(())
    }
}

fn write_extreme(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    point: Option<PricePoint>,
) -> fmt::Result {
    match point {
        Some(p) => writeln!(f, "{label} Closing Price: {} on {}", p.price, p.date),
        None => writeln!(f, "{label} Closing Price: {} on N/A", Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::generate_report;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn renders_full_report() {
        let mut opening = PriceSeries::new();
        opening.insert(date(2024, 1, 1), dec("9.50"));
        opening.insert(date(2024, 1, 2), dec("10.10"));

        let mut closing = PriceSeries::new();
        closing.insert(date(2024, 1, 1), dec("10"));
        closing.insert(date(2024, 1, 2), dec("15"));
        closing.insert(date(2024, 1, 3), dec("8"));

        let news = vec!["First headline".to_string(), "Second headline".to_string()];
        let report = generate_report(
            "DNA",
            &opening,
            &closing,
            &news,
            date(2024, 1, 1),
            date(2024, 1, 10),
        )
        .unwrap();

        let expected = "\
Stock Analysis Summary:
Stock Symbol: DNA
Start Date: 2024-01-01
End Date: 2024-01-10
Daily Opening and Closing Prices:
Date: 2024-01-01 | Opening Price: 9.50 | Closing Price: 10
Date: 2024-01-02 | Opening Price: 10.10 | Closing Price: 15
Date: 2024-01-03 | Opening Price: 0 | Closing Price: 8
Percentage Change Over Period: -20.00%
Recommendation: Sell (negative trend)
Highest Closing Price: 15 on 2024-01-02
Lowest Closing Price: 8 on 2024-01-03

Latest News Articles:
- First headline
- Second headline
";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn renders_empty_series_and_news_fallback() {
        let empty = PriceSeries::new();
        let report =
            generate_report("ZZZ", &empty, &empty, &[], date(2024, 1, 1), date(2024, 1, 2))
                .unwrap();
        let text = report.to_string();

        assert!(text.contains("Percentage Change Over Period: 0.00%\n"));
        assert!(text.contains("Recommendation: Hold (neutral trend)\n"));
        assert!(text.contains("Highest Closing Price: 0 on N/A\n"));
        assert!(text.contains("Lowest Closing Price: 0 on N/A\n"));
        assert!(text.ends_with("Latest News Articles:\nNo news available for this stock.\n"));
    }

    #[test]
    fn rounds_change_half_up() {
        let mut closing = PriceSeries::new();
        closing.insert(date(2024, 1, 1), dec("3"));
        closing.insert(date(2024, 1, 2), dec("4"));
        let empty = PriceSeries::new();
        let report =
            generate_report("DNA", &empty, &closing, &[], date(2024, 1, 1), date(2024, 1, 2))
                .unwrap();
        assert!(report.to_string().contains("Percentage Change Over Period: 33.33%\n"));

        let mut r = report.clone();
        r.percentage_change = dec("12.345");
        assert_eq!(r.rounded_percentage_change(), dec("12.35"));
        r.percentage_change = dec("-12.345");
        assert_eq!(r.rounded_percentage_change(), dec("-12.35"));
        r.percentage_change = dec("-0.004");
        assert_eq!(r.rounded_percentage_change().to_string(), "0");
    }
}
