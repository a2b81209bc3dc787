use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "strata", version, about = "Sharded multi-backend content storage")]
struct Cli {
    /// Path to a strata.toml config file. Defaults to ./strata.toml when
    /// present; tokens can also come from STRATA_<SERVICE>_TOKEN.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shard an (already encrypted) file across the configured backends
    /// and print the manifest cid.
    Put {
        file: PathBuf,
        /// Name recorded in the manifest; defaults to the file name.
        #[arg(long)]
        name: Option<String>,
        /// Opaque encryption key metadata carried in the manifest.
        #[arg(long)]
        key: Option<String>,
        /// Opaque encryption IV metadata carried in the manifest.
        #[arg(long)]
        iv: Option<String>,
    },
    /// Reassemble a payload from its manifest cid.
    Get {
        cid: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Probe every backend and report reachability.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Put {
            file,
            name,
            key,
            iv,
        } => commands::put(config, &file, name, key, iv).await,
        Commands::Get { cid, output } => commands::get(config, &cid, &output).await,
        Commands::Health => commands::health(config).await,
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
