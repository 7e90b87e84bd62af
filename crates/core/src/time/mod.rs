pub mod calendar;

pub use calendar::{lookback_start, parse_iso_date, today};
