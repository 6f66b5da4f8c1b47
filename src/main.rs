// src/main.rs
use signal_engine::config::Config;
use signal_engine::domain::errors::AppResult;
use signal_engine::feed::{FeedRunner, SyntheticFeed};
use signal_engine::SignalEngine;

use tokio::signal::ctrl_c;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration: a JSON file if given, otherwise the environment
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting signal_engine v{}", env!("CARGO_PKG_VERSION"));
    log::warn!("Using the synthetic feed: prices are SIMULATED, not market data");

    let feed = SyntheticFeed::from_config(&config.feed);
    let engine = SignalEngine::new(config)?;
    let runner = FeedRunner::new(engine);

    // Report every analysis as it arrives
    let mut analysis_rx = runner.subscribe();
    tokio::spawn(async move {
        loop {
            match analysis_rx.recv().await {
                Ok(analysis) => {
                    let rec = &analysis.recommendation;
                    log::info!(
                        "{} @ {:.2} | score {} | confidence {:.0}% | {}",
                        rec.label,
                        rec.price,
                        rec.score,
                        rec.confidence,
                        rec.reason_text()
                    );
                    if analysis.plan.is_actionable() {
                        let plan = &analysis.plan;
                        log::info!(
                            "Plan: entry {:.2} | TP {:.2} | SL {:.2} | R:R {:.2} | size {:.6} ({:.2}) | hold {}",
                            plan.entry,
                            plan.take_profit,
                            plan.stop_loss,
                            plan.risk_reward_ratio,
                            plan.position_size,
                            plan.position_value,
                            plan.hold_time
                                .map(|h| h.to_string())
                                .unwrap_or_else(|| "-".to_string())
                        );
                    }
                    if let Some(risk) = analysis.outlook.risk_level {
                        log::debug!(
                            "Risk {} | est. win rate {:.0}% | reversal odds {:.0}%",
                            risk,
                            analysis.outlook.win_rate_pct,
                            analysis.outlook.reversal.probability_pct
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Reporter lagged, skipped {} analyses", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let handle = runner.start(feed)?;

    // Wait for shutdown signal
    log::info!("Engine is running. Press Ctrl+C to stop.");
    ctrl_c().await?;

    // Shutdown
    log::info!("Shutting down...");
    runner.stop();
    if let Err(e) = handle.await {
        log::error!("Feed runner task failed: {}", e);
    }

    let engine = runner.engine();
    let engine = engine.lock().await;
    for (label, count) in engine.history().label_counts() {
        log::info!("{}: {} cycles", label, count);
    }

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}
