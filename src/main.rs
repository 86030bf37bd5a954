//! IP Reputation service CLI.

use anyhow::{bail, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use ip_reputation_client::{ClientConfig, OperationResult, ReputationClient, ResponseBody};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const NOT_FOUND: &str = "reputation entry not found";

#[derive(Parser, Debug)]
#[command(name = "ip-reputation")]
#[command(about = "Command line client for managing IP reputations")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "ip-reputation.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request reputation for an IP address
    Get { ip: String },
    /// Create a reputation entry
    Create { ip: String, reputation: u8 },
    /// Update an existing reputation entry
    Update { ip: String, reputation: u8 },
    /// Delete a reputation entry
    Remove { ip: String },
    /// Record a violation against an IP address
    Violation { ip: String, violation_type: String },
    /// List known violation types and their penalties
    Violations,
    /// Set reputation to 0 for an IP or CIDR
    Ban { ip: String },
    /// Set reputation to 100 for an IP or CIDR
    Unban { ip: String },
    /// Set the reviewed flag (true or false) on an existing entry
    Reviewed {
        ip: String,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        reviewed: bool,
    },
    /// Show the current exceptions list
    Exceptions,
    /// Check service health
    Heartbeat,
    /// Show the deployed service version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", ClientConfig::example());
        return Ok(());
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    info!(config = %args.config.display(), "Loading configuration");
    let config = ClientConfig::load(&args.config)?;

    // Handle --validate
    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let Some(command) = args.command else {
        bail!("no command given, see --help");
    };

    let client = ReputationClient::new(config)?;

    let result = match command {
        Command::Get { ref ip } => {
            let result = client.fetch(ip).await?;
            if result.status == 404 {
                println!("{}", NOT_FOUND);
                return Ok(());
            }
            result
        }
        Command::Create { ref ip, reputation } => client.create(ip, reputation).await?,
        Command::Update { ref ip, reputation } => client.update(ip, reputation).await?,
        Command::Remove { ref ip } => client.remove(ip).await?,
        Command::Violation {
            ref ip,
            ref violation_type,
        } => client.record_violation(ip, violation_type).await?,
        Command::Violations => client.list_violations().await?,
        Command::Ban { ref ip } => {
            let result = client.ban(ip).await?;
            if result.is_success() {
                println!("Banned {} on {}", ip, client.base_url());
            }
            result
        }
        Command::Unban { ref ip } => {
            let result = client.unban(ip).await?;
            if result.is_success() {
                println!("Unbanned {} on {}", ip, client.base_url());
            }
            result
        }
        Command::Reviewed { ref ip, reviewed } => client.set_reviewed(ip, reviewed).await?,
        Command::Exceptions => client.exceptions().await?,
        Command::Heartbeat => client.heartbeat().await?,
        Command::Version => client.version().await?,
    };

    print_result(&result)?;

    if !result.is_success() {
        bail!("service responded with status {}", result.status);
    }

    Ok(())
}

fn print_result(result: &OperationResult) -> Result<()> {
    print!("{}", format_result(result)?);
    Ok(())
}

/// Status line followed by the body, pretty-printed when it is JSON.
fn format_result(result: &OperationResult) -> Result<String> {
    let mut out = format!("{}\n", result.status);
    match result.body {
        Some(ResponseBody::Json(ref value)) => {
            out.push_str(&serde_json::to_string_pretty(value)?);
            out.push('\n');
        }
        Some(ResponseBody::Text(ref text)) => {
            out.push_str(text);
            out.push('\n');
        }
        None => {}
    }
    Ok(out)
}
