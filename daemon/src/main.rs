//! Arena daemon: runs the node and its HTTP API, plus wallet helpers for
//! signing in from the command line.

use std::path::PathBuf;
use std::time::Duration;

use agt_crypto::{derive_address, generate_keypair, keypair_from_private, sign_message};
use agt_node::{init_logging, ArenaNode, NodeConfig, ShutdownController, StorageBackend};
use agt_rpc::{RpcServer, RpcState};
use agt_types::PrivateKey;
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "agt-daemon", about = "Agent Got Talent arena daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the node and serve the HTTP API.
    Serve(ServeArgs),
    /// Print the effective configuration as TOML.
    Config(ServeArgs),
    /// Generate a wallet keypair and print its address.
    Keygen,
    /// Sign a challenge message with a wallet private key.
    Sign {
        /// Hex-encoded 32-byte private key.
        #[arg(long, env = "AGT_PRIVATE_KEY")]
        private_key: String,
        /// Message to sign. Reads from --message-file when absent.
        #[arg(long, conflicts_with = "message_file")]
        message: Option<String>,
        #[arg(long)]
        message_file: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "AGT_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "AGT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend: "lmdb" or "memory".
    #[arg(long, env = "AGT_STORAGE")]
    storage: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "AGT_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Hex-encoded session signing key.
    #[arg(long, env = "AGT_SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Super admin wallet addresses (comma-separated).
    #[arg(long, env = "AGT_SUPER_ADMINS", value_delimiter = ',')]
    super_admins: Vec<String>,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long, env = "AGT_ENABLE_METRICS")]
    metrics: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGT_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGT_LOG_LEVEL")]
    log_level: Option<String>,
}

impl ServeArgs {
    /// File (or defaults) first, then every flag that was given.
    fn resolve(self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                NodeConfig::from_toml_file(&path)
                    .with_context(|| format!("loading config from {path}"))?
            }
            None => NodeConfig::default(),
        };

        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(storage) = self.storage {
            config.storage = storage.parse::<StorageBackend>()?;
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if self.session_secret.is_some() {
            config.session_secret = self.session_secret;
        }
        for address in self.super_admins {
            let address = address.trim().to_string();
            if !address.is_empty() && !config.super_admins.contains(&address) {
                config.super_admins.push(address);
            }
        }
        config.enable_metrics |= self.metrics;
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => serve(args.resolve()?).await,
        Command::Config(args) => {
            print!("{}", args.resolve()?.to_toml_string()?);
            Ok(())
        }
        Command::Keygen => {
            let keys = generate_keypair();
            println!("address:     {}", derive_address(&keys.public));
            println!("public_key:  {}", hex::encode(keys.public.as_bytes()));
            println!("private_key: {}", hex::encode(keys.private.0));
            Ok(())
        }
        Command::Sign {
            private_key,
            message,
            message_file,
        } => {
            let message = match (message, message_file) {
                (Some(message), _) => message,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => bail!("either --message or --message-file is required"),
            };
            let private = parse_private_key(&private_key)?;
            let keys = keypair_from_private(private);
            let signature = sign_message(message.as_bytes(), &keys.private);
            println!("address:   {}", derive_address(&keys.public));
            println!("signature: {}", signature.to_hex());
            Ok(())
        }
    }
}

async fn serve(config: NodeConfig) -> anyhow::Result<()> {
    init_logging(config.log_format()?, &config.log_level)?;
    info!(
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        metrics = config.enable_metrics,
        "starting arena daemon"
    );

    let node = ArenaNode::open(config)?;
    let state = RpcState {
        arena: node.arena.clone(),
        metrics: node.config.enable_metrics.then(|| node.metrics.clone()),
    };

    let controller = ShutdownController::new();
    let server = RpcServer::new(node.config.rpc_port, state);
    let mut server_task = tokio::spawn(server.start(controller.signal().wait()));

    tokio::select! {
        biased;
        signal = controller.wait_for_signal() => {
            signal?;
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server_task).await {
                Ok(joined) => joined??,
                Err(_) => {
                    warn!("HTTP API did not stop in time, aborting");
                    server_task.abort();
                }
            }
        }
        joined = &mut server_task => joined??,
    }

    info!("arena daemon stopped");
    Ok(())
}

fn parse_private_key(raw: &str) -> anyhow::Result<PrivateKey> {
    let bytes = hex::decode(raw.trim()).context("private key is not hex")?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("private key must be 32 bytes"))?;
    Ok(PrivateKey(bytes))
}
