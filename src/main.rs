//! Radio Signal Agent CLI
//!
//! Query cellular and WiFi signal state, or watch it change.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use radio_signal_agent::{
    AgentOptions, Config, NativeSource, PlatformSource, PlatformTier, ReplaySource, SignalAgent,
    VERSION,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radio-signal")]
#[command(version = VERSION)]
#[command(about = "Cellular and WiFi signal telemetry", long_about = None)]
struct Cli {
    /// Serve readings from a JSON snapshot instead of the native platform
    #[arg(long, global = true)]
    replay: Option<PathBuf>,

    /// Force a platform tier (legacy, standard or modern)
    #[arg(long, global = true, value_parser = parse_tier)]
    tier: Option<PlatformTier>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cell report
    Cell,

    /// Print the current WiFi report
    Wifi,

    /// Subscribe and print events until Ctrl+C
    Watch {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Show configuration, optionally updating it first
    Config {
        /// Write the default configuration, replacing the existing file
        #[arg(long)]
        init: bool,

        /// Store a tier override in the configuration file
        #[arg(long, value_parser = parse_tier)]
        set_tier: Option<PlatformTier>,
    },

    /// Serve the query surface over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (0 picks a free one)
        #[arg(long, default_value = "8787")]
        port: u16,
    },
}

fn parse_tier(s: &str) -> Result<PlatformTier, String> {
    PlatformTier::parse(s).ok_or_else(|| format!("unknown tier '{s}'"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let replay = cli.replay;
    let tier = cli.tier;

    let result = match cli.command {
        Commands::Cell => build_agent(replay, tier).and_then(|agent| cmd_cell(&agent)),
        Commands::Wifi => build_agent(replay, tier).and_then(|agent| cmd_wifi(&agent)),
        Commands::Watch { seconds } => {
            build_agent(replay, tier).map(|agent| cmd_watch(&agent, seconds))
        }
        Commands::Config { init, set_tier } => cmd_config(init, set_tier),
        #[cfg(feature = "server")]
        Commands::Serve { port } => build_agent(replay, tier).and_then(|agent| cmd_serve(agent, port)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Build the agent from the config file, with CLI flags taking precedence.
fn build_agent(replay: Option<PathBuf>, tier: Option<PlatformTier>) -> anyhow::Result<SignalAgent> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("using default configuration: {e}");
            Config::default()
        }
    };

    let mut options = AgentOptions::from(&config);
    if tier.is_some() {
        options.tier = tier;
    }

    let source: Arc<dyn PlatformSource> = match replay.or(config.replay_path) {
        Some(path) => Arc::new(
            ReplaySource::from_file(&path)
                .with_context(|| format!("loading replay snapshot {}", path.display()))?,
        ),
        None => Arc::new(NativeSource::new()),
    };

    Ok(SignalAgent::new(source, options))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_cell(agent: &SignalAgent) -> anyhow::Result<()> {
    let report = agent.get_cell_report()?;
    print_json(&report)
}

fn cmd_wifi(agent: &SignalAgent) -> anyhow::Result<()> {
    let report = agent.get_wifi_report()?;
    print_json(&report)
}

fn cmd_watch(agent: &SignalAgent, seconds: Option<u64>) {
    println!("Radio Signal Agent v{VERSION}");
    println!("  Tier: {:?}", agent.tier());
    println!("  Acquisition: {:?}", agent.acquisition_mode());
    if let Some(secs) = seconds {
        println!("  Duration: {secs}s");
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    let events = agent.subscribe_channel();

    // Prime the subscriber with the current cell state.
    if let Err(e) = agent.get_cell_report() {
        tracing::warn!("initial cell read failed: {e}");
    }

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => match event.to_payload() {
                Ok(payload) => println!("{payload}"),
                Err(e) => tracing::error!("failed to serialize event: {e}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                eprintln!("Event stream closed unexpectedly");
                break;
            }
        }
    }

    agent.unsubscribe();

    println!();
    println!("Session summary: {}", agent.stats().summary());
}

fn cmd_config(init: bool, set_tier: Option<PlatformTier>) -> anyhow::Result<()> {
    let path = Config::config_path();

    let config = if init || set_tier.is_some() {
        let mut config = if init {
            Config::default()
        } else {
            Config::load().context("reading existing configuration")?
        };
        if set_tier.is_some() {
            config.tier = set_tier;
        }
        config.save()?;
        println!("Saved configuration to {}", path.display());
        println!();
        config
    } else {
        Config::load().unwrap_or_default()
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", path);
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(agent: SignalAgent, port: u16) -> anyhow::Result<()> {
    use radio_signal_agent::server::{run, ServerConfig};

    let runtime = tokio::runtime::Runtime::new()?;
    let agent = Arc::new(agent);

    runtime.block_on(async move {
        let (addr, shutdown_tx) = run(ServerConfig::new(port), agent).await?;
        println!("Listening on http://{addr}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok(())
    })
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!("could not install Ctrl+C handler: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flags_parse() {
        let cli = Cli::try_parse_from(["radio-signal", "config", "--set-tier", "legacy"]).unwrap();
        match cli.command {
            Commands::Config { init, set_tier } => {
                assert!(!init);
                assert_eq!(set_tier, Some(PlatformTier::Legacy));
            }
            _ => panic!("expected config command"),
        }

        assert!(Cli::try_parse_from(["radio-signal", "config", "--set-tier", "ancient"]).is_err());
    }

    #[test]
    fn test_global_flags_reach_every_command() {
        let cli = Cli::try_parse_from([
            "radio-signal",
            "watch",
            "--seconds",
            "3",
            "--tier",
            "modern",
            "--replay",
            "device.json",
        ])
        .unwrap();
        assert_eq!(cli.tier, Some(PlatformTier::Modern));
        assert_eq!(cli.replay, Some(PathBuf::from("device.json")));
        assert!(matches!(cli.command, Commands::Watch { seconds: Some(3) }));
    }
}
