//! shuttlr - batched artifact transfer front door
//!
//! Pushes and pulls content-addressed artifacts against the configured
//! storage backend.

use clap::{Parser, Subcommand};
use shuttlr::{storage, Config, GetRequest, PutRequest};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Batched, pipelined artifact transfers
#[derive(Parser, Debug)]
#[command(name = "shuttlr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload files; each argument is `<object-key>=<path>`
    Put {
        #[arg(required = true)]
        objects: Vec<String>,
    },
    /// Download objects; each argument is `<object-key>=<path>`
    Get {
        #[arg(required = true)]
        objects: Vec<String>,
    },
}

fn parse_pair(arg: &str) -> anyhow::Result<(String, PathBuf)> {
    let (key, path) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected <object-key>=<path>, got '{arg}'"))?;
    Ok((key.to_string(), PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(&args.config)?;
    info!("Loaded configuration from {:?}", args.config);

    let backend = storage::from_config(&config)?;

    match args.command {
        Command::Put { objects } => {
            let requests = objects
                .iter()
                .map(|arg| {
                    let (key, path) = parse_pair(arg)?;
                    Ok(PutRequest::new(path, key))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            backend.put(&requests, &|r| info!(key = %r.object_key, "uploaded"))?;
            info!(count = requests.len(), "put complete");
        }
        Command::Get { objects } => {
            let requests = objects
                .iter()
                .map(|arg| {
                    let (key, path) = parse_pair(arg)?;
                    Ok(GetRequest::new(key, path))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            backend.get(&requests, &|r| info!(key = %r.object_key, "downloaded"))?;
            info!(count = requests.len(), "get complete");
        }
    }

    Ok(())
}
