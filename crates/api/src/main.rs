use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trends_core::analysis::{generate_report, AnalysisReport};
use trends_core::domain::contract::AnalyzeRequest;
use trends_core::market::MarketDataClient;

const ANALYZE_ERROR_BODY: &str = "Error analyzing stock.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = trends_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let market = match trends_core::market::from_settings(&settings) {
        Ok(client) => Some(client),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "market data client unavailable; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        market,
        analyze_timeout: Duration::from_secs(settings.analyze_timeout_secs),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stocks/search", get(search_symbols))
        .route("/api/stocks/analyze", post(analyze_stock))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    market: Option<Arc<dyn MarketDataClient>>,
    analyze_timeout: Duration,
}

impl AppState {
    fn market(&self) -> anyhow::Result<&dyn MarketDataClient> {
        self.market
            .as_deref()
            .context("market data client is not configured")
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

async fn search_symbols(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<String>>, StatusCode> {
    match search(&state, &params.query).await {
        Ok(symbols) => {
            tracing::info!(query = %params.query, matches = symbols.len(), "symbol search");
            Ok(Json(symbols))
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(
                query = %params.query,
                error = %format!("{e:#}"),
                "symbol search failed"
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn search(state: &AppState, query: &str) -> anyhow::Result<Vec<String>> {
    state.market()?.search_symbols(query).await
}

async fn analyze_stock(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<String, (StatusCode, &'static str)> {
    match run_analysis(&state, request).await {
        Ok(report) => Ok(report.to_string()),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "stock analysis failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, ANALYZE_ERROR_BODY))
        }
    }
}

async fn run_analysis(
    state: &AppState,
    request: AnalyzeRequest,
) -> anyhow::Result<AnalysisReport> {
    let market = state.market()?;
    let params = request.validate_and_into_params()?;

    tracing::info!(
        symbol = %params.symbol,
        start_date = %params.start_date,
        provider = %params.provider,
        interval = %params.interval,
        "analyze request"
    );
    if !params.provider.is_recognized() || !params.interval.is_recognized() {
        tracing::debug!(
            provider = %params.provider,
            interval = %params.interval,
            "unrecognized provider or interval; analysis ignores both"
        );
    }

    let symbol = params.symbol.as_str();
    let fetch = async {
        tokio::try_join!(
            market.closing_prices(symbol),
            market.opening_prices(symbol),
            market.news(symbol),
        )
    };
    let (closing, opening, news) = tokio::time::timeout(state.analyze_timeout, fetch)
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "market data fetch for {symbol} timed out after {:?}",
                state.analyze_timeout
            )
        })?
        .with_context(|| format!("market data fetch for {symbol} failed"))?;

    let end_date = trends_core::time::today(Utc::now());
    let report = generate_report(
        symbol,
        &opening,
        &closing,
        &news,
        params.start_date,
        end_date,
    )?;
    Ok(report)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &trends_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
