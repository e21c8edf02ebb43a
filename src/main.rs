//! Sports-betting arbitrage scanner entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use odds_arb::api::{create_router, AppState};
use odds_arb::arbitrage::{scan, ScanRequest};
use odds_arb::config::Config;
use odds_arb::metrics;
use odds_arb::odds::OddsApiClient;
use odds_arb::utils::shutdown_signal;

/// Sports-betting arbitrage scanner.
#[derive(Parser, Debug)]
#[command(name = "odds-arb")]
#[command(about = "Finds guaranteed-profit price combinations across bookmakers")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single scan and print the opportunities as JSON.
    Scan {
        /// Odds provider API key.
        #[arg(long, env = "ODDS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Bookmaker region (eu, uk, us, au).
        #[arg(long)]
        region: Option<String>,

        /// Minimum profit in percent.
        #[arg(long)]
        cutoff: Option<String>,

        /// Comma-separated market keys.
        #[arg(long)]
        markets: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    let loaded = Config::load();

    // Initialize logging
    let verbose = args.verbose || loaded.as_ref().map(|c| c.verbose).unwrap_or(false);
    let default_level = loaded
        .as_ref()
        .map(|c| c.rust_log.clone())
        .unwrap_or_else(|_| "info".to_string());
    let filter = if verbose {
        EnvFilter::new("odds_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Scan {
            api_key,
            region,
            cutoff,
            markets,
        }) => cmd_scan(config, api_key, region, cutoff, markets).await,
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await,
        None => cmd_serve(config, args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ODDS ARB - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Building odds provider client... ");
    match OddsApiClient::new(config) {
        Ok(client) => {
            println!("OK");
            println!("  Provider URL: {}", client.base_url());
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Odds provider client invalid"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!(
        "  API Key: {}",
        if config.api_key().is_some() { "configured" } else { "not set (must be passed per request)" }
    );
    println!("  Default Region: {}", config.default_region);
    println!("  Default Markets: {}", config.default_market_list().join(","));
    println!("  Default Cutoff: {}%", config.default_cutoff_pct);
    println!("  Total Stake: {}", config.total_stake);
    println!("  Fetch Timeout: {}ms", config.odds_fetch_timeout_ms);
    println!("  Port: {}", config.port);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run one scan and print the result.
async fn cmd_scan(
    config: Config,
    api_key: Option<String>,
    region: Option<String>,
    cutoff: Option<String>,
    markets: Option<String>,
) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let request = ScanRequest::resolve(
        api_key.as_deref(),
        region.as_deref(),
        cutoff.as_deref(),
        markets.as_deref(),
        &config,
    )?;
    let client = OddsApiClient::new(&config)?;

    let opportunities = scan(&client, &request).await?;
    println!("{}", serde_json::to_string_pretty(&opportunities)?);

    if opportunities.is_empty() {
        info!("No arbitrage opportunities found");
    }

    Ok(())
}

/// Serve the HTTP API until a shutdown signal arrives.
async fn cmd_serve(config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let port = port_override.unwrap_or(config.port);
    if config.api_key().is_none() {
        warn!("ODDS_API_KEY not set; every request must carry apiKey");
    }

    let client = OddsApiClient::new(&config)?;
    info!(provider = %client.base_url(), "Odds provider client ready");

    let metrics_enabled = config.metrics_enabled;
    let mut app_state = AppState::new(Arc::new(client), config);

    // Initialize metrics
    if metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => app_state = app_state.with_metrics(handle),
            Err(e) => warn!(error = %e, "Failed to install Prometheus recorder; /metrics disabled"),
        }
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());
    app_state.set_ready(true);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
