//! Quiz Sentry - quiz honeypot tracker
//!
//! One run per invocation, meant for an external schedule (cron, CI):
//! refresh tracked balances, scan recent blocks for new quiz contracts,
//! persist the list and rewrite the Markdown report.

use quiz_sentry::utils::constants::{APP_NAME, APP_VERSION};
use quiz_sentry::{DetectionRules, ErrorCode, ExplorerClient, ScannerConfig, Tracker};

use eyre::{eyre, Result};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║   🍯  {} v{:<10}                     ║
    ║       quiz honeypot tracker                  ║
    ╚══════════════════════════════════════════════╝
    "#,
        APP_NAME, APP_VERSION
    );

    let config = match ScannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            if e.code == ErrorCode::ConfigMissingApiKey {
                eprintln!("   Set ETHERSCAN_API_KEY to your explorer API key and retry.");
            }
            return Err(e.into());
        }
    };

    info!(
        "⛓️  Chain: {} ({}), lookback {} blocks",
        config.chain.name, config.chain.chain_id, config.lookback_blocks
    );
    info!(
        "📁 Store: {} | Report: {}",
        config.data_file.display(),
        config.report_file.display()
    );

    let client = ExplorerClient::new(&config)?;
    let rules = DetectionRules::quiz_scam();
    let tracker = Tracker::new(&client, &config, rules);

    let stats = tracker.run().await?;

    println!("\n📊 Run Summary:");
    println!("   Tracked:        {}", stats.tracked);
    println!("   Refreshed:      {} ({} failed)", stats.refreshed, stats.refresh_failures);
    println!("   Candidates:     {} ({} already tracked)", stats.candidates, stats.already_known);
    println!("   New Matches:    {} ({} failed)", stats.verified, stats.verification_failures);

    if config.strict_exit && stats.has_failures() {
        return Err(eyre!("Run finished with partial failures (STRICT_EXIT)"));
    }

    Ok(())
}
