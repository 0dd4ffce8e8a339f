//! # Shop Monitor CLI
//!
//! Runs the monitor daemon or a single action against the persisted state.
//!
//! One-shot actions (`check`, `test-alerts`) are handed to a running daemon
//! through its admin surface when one answers, so they queue behind the
//! daemon's cycles. Without a daemon they run here; the state file is locked
//! per access either way.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use shop_health_monitor::config::ConfigManager;
use shop_health_monitor::engine::{EngineBuilder, ReconciliationEngine};
use shop_health_monitor::logging::init_structured_logging;
use shop_health_monitor::scheduler::{MonitorScheduler, SchedulerConfig};
use shop_health_monitor::store::JsonFileStateStore;
use shop_health_monitor::web::{self, AdminClient, AppState};

#[derive(Parser)]
#[command(name = "shop-monitor")]
#[command(about = "Storefront health watchdog with cache remediation and alerting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration directory (default: $SHOP_MONITOR_CONFIG_DIR or ./config)
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment section to apply (default: $SHOP_MONITOR_ENV, $APP_ENV, or development)
    #[arg(short, long, global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and, when enabled, the admin surface
    Run,
    /// Run one reconciliation cycle now
    Check,
    /// Log a test incident, flush caches, and send a test alert
    TestAlerts,
    /// Print the dashboard
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load and validate configuration, then print it with secrets masked
    ValidateConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    if let Err(e) = execute(cli).await {
        error!("shop-monitor failed: {e:#}");
        eprintln!("❌ {e:#}");
        process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    }
    .context("loading configuration")?;

    match cli.command {
        Commands::ValidateConfig => {
            println!("✅ Configuration valid");
            println!("Environment: {}", manager.environment());
            println!("Directory:   {}", manager.config_directory().display());
            println!("{}", serde_json::to_string_pretty(&manager.debug_config())?);
            Ok(())
        }
        Commands::Check => {
            if forward_to_daemon(&manager, "check").await? {
                return Ok(());
            }
            let engine = build_engine(&manager)?;
            let report = engine.reconcile().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.recovery_check_requested {
                tokio::time::sleep(manager.config().recovery_check_delay()).await;
                let recovered = engine.run_recovery_check().await?;
                println!("Follow-up recovery check: {}", if recovered { "recovered" } else { "still empty" });
            }
            Ok(())
        }
        Commands::TestAlerts => {
            if forward_to_daemon(&manager, "test-alerts").await? {
                return Ok(());
            }
            let engine = build_engine(&manager)?;
            let report = engine.run_test_alert().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Status { json } => {
            let engine = build_engine(&manager)?;
            let snapshot = engine.dashboard()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", snapshot.render());
            }
            Ok(())
        }
        Commands::Run => run_daemon(&manager).await,
    }
}

/// Run the action on a running daemon; `false` when none answered
async fn forward_to_daemon(manager: &ConfigManager, action: &str) -> Result<bool> {
    let admin = &manager.config().admin;
    if !admin.enabled {
        return Ok(false);
    }

    let client = AdminClient::new(&admin.bind_address)?;
    match client
        .run_action(action)
        .await
        .with_context(|| format!("running {action} on the daemon at {}", client.base_url()))?
    {
        Some(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn build_engine(manager: &ConfigManager) -> Result<ReconciliationEngine> {
    let config = manager.config();
    let client = reqwest::Client::builder()
        .timeout(config.catalog_timeout())
        .build()
        .context("building HTTP client")?;
    let store = Arc::new(JsonFileStateStore::new(&config.storage.state_file));

    Ok(EngineBuilder::from_config(config, store, client)?.build())
}

async fn run_daemon(manager: &ConfigManager) -> Result<()> {
    let config = manager.config();
    let engine = Arc::new(build_engine(manager)?);
    let scheduler = MonitorScheduler::new(engine, SchedulerConfig::from_config(config));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let admin = if config.admin.enabled {
        let state = AppState::new(scheduler.clone(), manager.environment());
        let bind_address = config.admin.bind_address.clone();
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            web::serve(&bind_address, state, rx).await
        }))
    } else {
        None
    };

    let runner = {
        let scheduler = scheduler.clone();
        let rx = shutdown_rx.clone();
        tokio::spawn(async move { scheduler.run(rx).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    runner.await.context("scheduler task panicked")?;
    if let Some(admin) = admin {
        admin
            .await
            .context("admin task panicked")?
            .context("admin surface failed")?;
    }
    Ok(())
}
