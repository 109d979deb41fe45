#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

use std::io::Read as _;
use std::path::PathBuf;

use clap::Parser;
use herald::{DeliveryOrchestrator, GatewayConfig, SpoolSender, default_registry};
use herald_common::{
    address::{Address, AddressList},
    audit,
    envelope::Envelope,
    logging,
    message::MailMessage,
    options,
};
use tracing::info;

/// Deliver one message through the gateway and notify on the outcome
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Deliver a message and notify on the outcome", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the gateway configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Envelope sender (reverse-path); the From: header stands in when omitted
    #[arg(short, long)]
    sender: Option<String>,

    /// Envelope recipient, repeatable; the To: header stands in when omitted
    #[arg(short, long = "recipient")]
    recipients: Vec<String>,

    /// Message file to deliver; read from stdin when omitted
    message: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init();

    let config_path = match cli.config {
        Some(path) => path,
        None => find_config_file()?,
    };
    let config = GatewayConfig::load(&config_path)?;

    audit::init(config.audit.clone());
    options::init(config.options.clone());

    let sender = SpoolSender::new(config.outbound_spool.clone());
    let orchestrator =
        DeliveryOrchestrator::from_config(&config, &default_registry(), Box::new(sender))?;

    let raw = match &cli.message {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    let mut message = MailMessage::parse(&raw)?;

    let envelope = Envelope::new(
        cli.sender.as_deref().map(Address::parse).transpose()?,
        (!cli.recipients.is_empty())
            .then(|| AddressList::parse(&cli.recipients.join(", ")))
            .transpose()?,
    );

    let outcome = orchestrator.handle(&envelope, &mut message);
    info!(outcome = outcome.as_str(), "Transaction complete");

    Ok(())
}

/// Find the configuration file using the following precedence:
/// 1. `HERALD_CONFIG` environment variable
/// 2. ./herald.toml (current working directory)
/// 3. /etc/herald/herald.toml (system-wide config)
fn find_config_file() -> anyhow::Result<PathBuf> {
    if let Ok(env_path) = std::env::var("HERALD_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "HERALD_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = vec![
        PathBuf::from("./herald.toml"),
        PathBuf::from("/etc/herald/herald.toml"),
    ];

    for path in &default_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let paths_tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No configuration file found. Tried:\n  - HERALD_CONFIG environment variable\n{paths_tried}"
    )
}
