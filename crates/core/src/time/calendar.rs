use anyhow::Context;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

pub fn parse_iso_date(s: &str) -> anyhow::Result<NaiveDate> {
    let t = s.trim();
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .with_context(|| format!("not a YYYY-MM-DD date: {t:?}"))
}

/// Calendar date of `now_utc` in the server's local time zone. Reports use it as their end date.
pub fn today(now_utc: DateTime<Utc>) -> NaiveDate {
    now_utc.with_timezone(&Local).date_naive()
}

pub fn lookback_start(today: NaiveDate, weeks: i64) -> NaiveDate {
    today - Duration::weeks(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(
            parse_iso_date(" 2024-01-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(parse_iso_date("2024-13-01").is_err());
        assert!(parse_iso_date("2024/01/01").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn lookback_spans_whole_weeks() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(lookback_start(d, 2), NaiveDate::from_ymd_opt(2025, 12, 22).unwrap());
    }

    #[test]
    fn today_is_within_a_day_of_utc_date() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let d = today(now);
        let utc_date = now.date_naive();
        assert!((d - utc_date).num_days().abs() <= 1);
    }
}
