use crate::domain::recommendation::Recommendation;
use crate::domain::PriceSeries;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub mod error;
pub mod report;

pub use error::AnalysisError;
pub use report::{AnalysisReport, PricePoint};

/// Borrowed view over one symbol's fetched data.
#[derive(Debug, Clone, Copy)]
pub struct StockAnalyzer<'a> {
    symbol: &'a str,
    opening: &'a PriceSeries,
    closing: &'a PriceSeries,
    news: &'a [String],
}

impl<'a> StockAnalyzer<'a> {
    pub fn new(
        symbol: &'a str,
        opening: &'a PriceSeries,
        closing: &'a PriceSeries,
        news: &'a [String],
    ) -> Self {
        Self {
            symbol,
            opening,
            closing,
            news,
        }
    }

    /// Change from the first to the last close of the series, in percent. The series is
    /// date-ordered, so this spans the earliest and latest fetched trading dates regardless of
    /// the requested range.
    pub fn percentage_change(&self) -> Result<Decimal, AnalysisError> {
        if self.closing.len() < 2 {
            return Ok(Decimal::ZERO);
        }
        let (Some((&first_date, &first)), Some((_, &last))) =
            (self.closing.iter().next(), self.closing.iter().next_back())
        else {
            return Ok(Decimal::ZERO);
        };

        if first.is_zero() {
            return Err(AnalysisError::ZeroBasePrice {
                symbol: self.symbol.to_string(),
                date: first_date,
            });
        }

        last.checked_sub(first)
            .and_then(|diff| diff.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|scaled| scaled.checked_div(first))
            .ok_or_else(|| AnalysisError::Overflow {
                symbol: self.symbol.to_string(),
            })
    }

    pub fn recommendation(&self) -> Result<Recommendation, AnalysisError> {
        let change = self.percentage_change()?;
        Ok(Recommendation::from_percentage_change(change))
    }

    /// Highest close; the earliest date wins a tie.
    pub fn highest_close(&self) -> Option<PricePoint> {
        self.extreme_close(|candidate, best| candidate > best)
    }

    /// Lowest close; the earliest date wins a tie.
    pub fn lowest_close(&self) -> Option<PricePoint> {
        self.extreme_close(|candidate, best| candidate < best)
    }

    fn extreme_close(&self, replaces: impl Fn(Decimal, Decimal) -> bool) -> Option<PricePoint> {
        let mut best: Option<PricePoint> = None;
        for (&date, &price) in self.closing {
            match best {
                Some(current) if !replaces(price, current.price) => {}
                _ => best = Some(PricePoint { date, price }),
            }
        }
        best
    }

    pub fn report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AnalysisReport, AnalysisError> {
        let percentage_change = self.percentage_change()?;

        Ok(AnalysisReport {
            symbol: self.symbol.to_string(),
            start_date,
            end_date,
            opening_prices: self.opening.clone(),
            closing_prices: self.closing.clone(),
            percentage_change,
            recommendation: Recommendation::from_percentage_change(percentage_change),
            highest_close: self.highest_close(),
            lowest_close: self.lowest_close(),
            news: self.news.to_vec(),
        })
    }
}

pub fn generate_report(
    symbol: &str,
    opening: &PriceSeries,
    closing: &PriceSeries,
    news: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<AnalysisReport, AnalysisError> {
    let report = StockAnalyzer::new(symbol, opening, closing, news).report(start_date, end_date)?;

    tracing::debug!(
        symbol,
        closes = closing.len(),
        headlines = news.len(),
        percentage_change = %report.percentage_change,
        recommendation = report.recommendation.label(),
        "stock analysis computed"
    );

    Ok(report)
}
