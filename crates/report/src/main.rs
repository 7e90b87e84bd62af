use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trends_core::analysis::generate_report;
use trends_core::config::Settings;

const DEFAULT_LOOKBACK_WEEKS: i64 = 2;

#[derive(Debug, Parser)]
#[command(name = "trends_report")]
struct Args {
    /// Ticker symbol to analyze.
    #[arg(long, default_value = "DNA")]
    symbol: String,

    /// First date of the report (YYYY-MM-DD). Defaults to two weeks before today.
    #[arg(long)]
    start_date: Option<String>,

    /// Market data backend (alpha_vantage or stub). Overrides MARKET_DATA_PROVIDER.
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(provider) = args.provider.clone() {
        settings.market_data_provider = Some(provider);
    }

    match run(&settings, &args).await {
        Ok(Some(report)) => {
            print!("{report}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(symbol = %args.symbol, error = %format!("{err:#}"), "report failed");
            Err(err)
        }
    }
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<Option<String>> {
    let today = trends_core::time::today(chrono::Utc::now());
    let start_date = match args.start_date.as_deref() {
        Some(s) => trends_core::time::parse_iso_date(s).context("invalid --start-date")?,
        None => trends_core::time::lookback_start(today, DEFAULT_LOOKBACK_WEEKS),
    };

    let market = trends_core::market::from_settings(settings)?;
    let symbol = args.symbol.trim();
    anyhow::ensure!(!symbol.is_empty(), "--symbol must be non-empty");

    let closing = market.closing_prices(symbol).await?;
    let opening = market.opening_prices(symbol).await?;
    let news = market.news(symbol).await?;

    if closing.is_empty() || opening.is_empty() {
        tracing::warn!(
            symbol,
            provider = market.provider_name(),
            closes = closing.len(),
            opens = opening.len(),
            "unable to retrieve stock data; check the market data configuration or network connection"
        );
        return Ok(None);
    }

    let report = generate_report(symbol, &opening, &closing, &news, start_date, today)?;
    Ok(Some(report.to_string()))
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["trends_report"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_to_dna() {
        let a = args(&[]);
        assert_eq!(a.symbol, "DNA");
        assert!(a.start_date.is_none());
        assert!(a.provider.is_none());
    }

    #[tokio::test]
    async fn prints_report_from_stub() {
        let a = args(&["--symbol", "dna", "--start-date", "2024-01-02"]);
        let report = run(&Settings::stub(), &a).await.unwrap().unwrap();
        assert!(report.starts_with("Stock Analysis Summary:\n"));
        assert!(report.contains("Stock Symbol: dna\n"));
        assert!(report.contains("Start Date: 2024-01-02\n"));
    }

    #[tokio::test]
    async fn skips_report_when_no_prices() {
        let a = args(&["--symbol", "NOPE"]);
        assert!(run(&Settings::stub(), &a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_bad_start_date() {
        let a = args(&["--start-date", "02/01/2024"]);
        assert!(run(&Settings::stub(), &a).await.is_err());
    }
}
