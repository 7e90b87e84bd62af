pub mod analysis;
pub mod domain;
pub mod market;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_ANALYZE_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub market_data_provider: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub market_data_timeout_secs: Option<u64>,
        pub market_data_attempts: Option<u32>,
        pub analyze_timeout_secs: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                market_data_provider: non_empty_var("MARKET_DATA_PROVIDER"),
                market_data_base_url: non_empty_var("MARKET_DATA_BASE_URL"),
                market_data_api_key: non_empty_var("MARKET_DATA_API_KEY"),
                market_data_timeout_secs: parse_var("MARKET_DATA_TIMEOUT_SECS")?,
                market_data_attempts: parse_var("MARKET_DATA_ATTEMPTS")?,
                analyze_timeout_secs: parse_var("ANALYZE_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_ANALYZE_TIMEOUT_SECS),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        /// Settings for an in-process stub provider; used by tests and local runs.
        pub fn stub() -> Self {
            Self {
                market_data_provider: Some("stub".to_string()),
                market_data_base_url: None,
                market_data_api_key: None,
                market_data_timeout_secs: None,
                market_data_attempts: None,
                analyze_timeout_secs: DEFAULT_ANALYZE_TIMEOUT_SECS,
                sentry_dsn: None,
            }
        }

        pub fn require_market_data_api_key(&self) -> anyhow::Result<&str> {
            self.market_data_api_key
                .as_deref()
                .context("MARKET_DATA_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match non_empty_var(key) {
            Some(s) => s
                .parse::<T>()
                .map(Some)
                .with_context(|| format!("{key} is not a valid number: {s}")),
            None => Ok(None),
        }
    }
}
