//! Rigpad CLI — Command-line interface for tracking sessions and tools.
//!
//! Usage:
//!   rigpad run [OPTIONS]       Run a tracking session against a demo rig
//!   rigpad send [OPTIONS]      Send test vectors or queries over UDP
//!   rigpad validate <PATH>     Validate a group-config JSON file
//!   rigpad check               Check configuration and capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rigpad",
    about = "2D control-pad rig driver with face tracking and remote input",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking session against a built-in demo rig
    Run {
        /// UDP port for remote control
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Disable the remote-control listener
        #[arg(long)]
        no_remote: bool,

        /// Disable the synthetic landmark source
        #[arg(long)]
        no_tracker: bool,

        /// Simulated capture rate of the synthetic source (Hz)
        #[arg(long, default_value = "30")]
        capture_fps: u32,

        /// Consumer tick interval in milliseconds
        #[arg(long, default_value = "50")]
        tick_ms: u64,
    },

    /// Send a test datagram to a running instance
    Send {
        /// Destination address
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        addr: String,

        /// Horizontal control value
        #[arg(short, long, allow_hyphen_values = true)]
        x: Option<f64>,

        /// Vertical control value
        #[arg(short, long, allow_hyphen_values = true)]
        y: Option<f64>,

        /// Address the vector to a specific group UID
        #[arg(short, long)]
        group: Option<String>,

        /// Query the group listing instead of sending a vector
        #[arg(long)]
        get_groups: bool,
    },

    /// Validate a group-config JSON file
    Validate {
        /// Path to the config file
        path: PathBuf,
    },

    /// Check configuration and capabilities
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    rigpad_common::logging::init_logging(&rigpad_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Run {
            port,
            no_remote,
            no_tracker,
            capture_fps,
            tick_ms,
        } => commands::run::run(port, !no_remote, !no_tracker, capture_fps, tick_ms).await,
        Commands::Send {
            addr,
            x,
            y,
            group,
            get_groups,
        } => commands::send::run(addr, x, y, group, get_groups),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Check => commands::check::run(),
    }
}
