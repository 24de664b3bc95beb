//! BJJ Academy API entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bjj_academy_api::config::Config;
use bjj_academy_api::reload::Restart;
use bjj_academy_api::utils::shutdown_signal;
use bjj_academy_api::{ServeExit, Server};

/// BJJ Academy API server.
#[derive(Parser, Debug)]
#[command(name = "bjj-academy-api")]
#[command(about = "Minimal HTTP API for a BJJ academy")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Command-line overrides for the environment configuration.
#[derive(clap::Args, Debug, Clone)]
struct Overrides {
    /// Address to listen on.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug mode (verbose error pages, reload on rebuild).
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the effective configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    let overrides = match &args.command {
        Some(Command::Run { overrides }) => overrides.clone(),
        _ => args.overrides.clone(),
    };
    apply_overrides(&mut config, overrides);
    config.validate()?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Run { .. }) | None => {
            init_logging(&config, args.verbose);
            cmd_run(config).await
        }
    }
}

fn apply_overrides(config: &mut Config, overrides: Overrides) {
    if let Some(host) = overrides.host {
        config.host = host;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if overrides.debug {
        config.debug = true;
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("bjj_academy_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Print the effective configuration.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("==================================================");
    println!("BJJ ACADEMY API - CONFIGURATION CHECK");
    println!("==================================================");
    println!("  Listen address: {}", config.socket_addr()?);
    println!("  Debug mode: {}", if config.debug { "ON" } else { "off" });
    println!("  Log level: {}", config.log_level);
    println!("  Log format: {}", config.log_format);
    if config.debug {
        println!("  WARNING: debug mode shows panic details to clients.");
    }
    println!("==================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("==================================================");

    Ok(())
}

/// Serve until shutdown; on a debug-mode reload, hand over to the new binary.
async fn cmd_run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;

    // Captured before serving: once a rebuild replaces the file the running
    // process can no longer resolve its own path.
    let restart = if config.debug {
        warn!("debug mode is on: panic details are sent to clients");
        Some(Restart::capture()?)
    } else {
        None
    };

    let mut server = Server::bind(addr, config.debug).await.map_err(|e| {
        error!("{}", e);
        e
    })?;
    if let Some(restart) = &restart {
        server = server.with_reload_watcher(restart.watcher());
    }

    match (server.serve(shutdown_signal()).await?, restart) {
        (ServeExit::Reload, Some(restart)) => {
            info!("restarting rebuilt executable");
            let code = restart.run().await?;
            std::process::exit(code);
        }
        _ => {
            info!("server stopped");
            Ok(())
        }
    }
}
