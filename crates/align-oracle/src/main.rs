use align_oracle::agent::{AgentConfig, OracleAgent};
use align_oracle::client::InProcessLedgerClient;
use align_oracle::config::OracleConfig;
use align_oracle::judge::HttpJudge;
use align_oracle::logging::init_logging;
use align_protocol::{AlignmentLedger, ProtocolParams};
use align_types::PublicKey;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::RngCore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "align-oracle")]
#[command(about = "Alignment Protocol AI oracle agent", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the oracle agent
    Start,

    /// Write a default configuration file
    Init {
        /// Output directory for the configuration
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Generate a new oracle credential
    Keygen {
        /// Output file for the credential
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let config = load_config(cli.config.as_deref())?;
            init_logging(&config.logging, cli.verbose)?;
            start(config).await
        }
        Commands::Init { output } => {
            let path = output.join("oracle.toml");
            OracleConfig::default().save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
            Ok(())
        }
        Commands::Keygen { output } => {
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            let encoded = hex::encode(bytes);
            match output {
                Some(path) => {
                    std::fs::write(&path, &encoded)?;
                    println!("Credential written to {}", path.display());
                }
                None => println!("{}", encoded),
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<OracleConfig> {
    match path {
        Some(path) => OracleConfig::from_file(path),
        None => {
            let default_path = Path::new("oracle.toml");
            if default_path.exists() {
                OracleConfig::from_file(default_path)
            } else {
                Ok(OracleConfig::default())
            }
        }
    }
}

async fn start(config: OracleConfig) -> Result<()> {
    let raw = std::fs::read_to_string(&config.agent.keypair_path).with_context(|| {
        format!(
            "Failed to read oracle credential {}",
            config.agent.keypair_path.display()
        )
    })?;
    let oracle = PublicKey::from_hex(&raw).context("Oracle credential is not a 32-byte hex key")?;

    info!(
        oracle = %oracle,
        program_id = %config.ledger.program_id,
        endpoint = %config.ledger.endpoint,
        "Oracle agent starting"
    );

    let client = match config.ledger.backend.as_str() {
        // The in-process ledger stands in for the remote execution engine
        // during development; a remote RPC client plugs in behind the same
        // LedgerClient seam.
        "memory" => {
            let ledger = Arc::new(AlignmentLedger::new(oracle, oracle, ProtocolParams::default()));
            Arc::new(InProcessLedgerClient::new(ledger, oracle))
        }
        other => bail!("Unknown ledger backend: {}", other),
    };

    let api_key = config.judge_api_key()?;
    let judge = Arc::new(HttpJudge::new(&config.judge, api_key)?);

    let agent = OracleAgent::new(
        client,
        judge,
        AgentConfig {
            poll_interval: Duration::from_millis(config.agent.poll_interval_ms),
            worker_limit: config.agent.worker_limit,
            ..AgentConfig::default()
        },
    );

    let shutdown = agent.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received");
            let _ = shutdown.send(true);
        }
    });

    agent.run().await
}
