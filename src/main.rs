// =============================================================================
// Aurora Signal Scorer — Main Entry Point
// =============================================================================
//
// One run: score a batch of simulated transactions, print the summary and
// grouped signals, optionally write the export / HTML report, and optionally
// keep serving the scorer over HTTP until Ctrl+C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use aurora_signal_scorer::api;
use aurora_signal_scorer::app_state::AppState;
use aurora_signal_scorer::report::{self, format_score, generate_html_report};
use aurora_signal_scorer::runtime_config::{RuntimeConfig, CONFIG_PATH};
use aurora_signal_scorer::signals::analytics::DEFAULT_ANOMALY_THRESHOLD;
use aurora_signal_scorer::simulation::{simulate_input, MetricsGenerator};
use aurora_signal_scorer::SignalScorer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Aurora Signal Scorer starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    for var in config.apply_overrides(|key| std::env::var(key).ok()) {
        warn!(var, "Ignoring unparseable environment override");
    }

    info!(
        sample_count = config.sample_count,
        seed = ?config.seed,
        serve = config.serve,
        "Run configured"
    );

    // ── 2. Score simulated transactions ──────────────────────────────────
    let mut scorer = SignalScorer::new();
    let mut generator = MetricsGenerator::new(config.seed);
    simulate_input(&mut scorer, &mut generator, config.sample_count);

    if scorer.is_empty() {
        warn!("No transactions simulated, report will be empty");
    }

    // ── 3. Console summary ───────────────────────────────────────────────
    println!("{}", report::console_summary(&scorer)?);

    for signal in scorer.recent_signals(config.recent_count) {
        debug!(
            id = %signal.id,
            score = %format_score(signal.composite_score),
            classification = %signal.classification,
            "recent signal"
        );
    }
    if let Some(top) = scorer.sort_signals_by_score(true).first() {
        info!(
            id = %top.id,
            score = %format_score(top.composite_score),
            classification = %top.classification,
            "Highest-risk transaction"
        );
    }
    for signal in scorer.anomalous_signals(DEFAULT_ANOMALY_THRESHOLD) {
        warn!(
            id = %signal.id,
            score = %format_score(signal.composite_score),
            "Score outlier"
        );
    }

    // ── 4. Optional file output ──────────────────────────────────────────
    if let Some(path) = &config.export_path {
        report::write_output(path, &scorer.export_signals())?;
    }
    if let Some(path) = &config.html_report_path {
        report::write_output(path, &generate_html_report(scorer.signals()))?;
    }

    if !config.serve {
        info!("Run complete");
        return Ok(());
    }

    // ── 5. HTTP API ──────────────────────────────────────────────────────
    let admin_token = std::env::var("AURORA_ADMIN_TOKEN").ok();
    if admin_token.as_deref().map_or(true, str::is_empty) {
        warn!("AURORA_ADMIN_TOKEN is not set; mutating API routes are disabled");
    }

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, scorer, generator, admin_token));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Aurora Signal Scorer shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C, serving until killed");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
