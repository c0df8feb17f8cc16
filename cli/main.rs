#![forbid(unsafe_code)]

//! `pipe-courier-cli` — companion binary for exercising a pipe peer by hand.
//!
//! `send` constructs one envelope and delivers it within the fire-and-forget
//! contract; `listen` starts a receiver and prints each received message as
//! a JSON line until Ctrl-C. The JSON here is display formatting only — the
//! wire format is the crate's own codec.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pipe_courier::config::PipeConfig;
use pipe_courier::transport::pipe::{PipeReceiver, PipeSender};
use pipe_courier::transport::{BoxFuture, MessageHandler, ReceivedMessage, Receiver, Sender};
use pipe_courier::{CourierConfig, CourierError, Envelope, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pipe-courier-cli", about = "Send to and listen on pipe-courier pipes", version, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one message to a listening peer.
    Send {
        /// Pipe name to connect to; overrides the configured name.
        #[arg(long)]
        pipe: Option<String>,

        /// Header in `key=value` form; repeatable.
        #[arg(long = "header", value_name = "KEY=VALUE")]
        headers: Vec<String>,

        /// Originating-system header value.
        #[arg(long)]
        origin: Option<String>,

        /// Message payload.
        payload: String,
    },

    /// Listen on a pipe and print each received message as a JSON line.
    Listen {
        /// Pipe name to listen on; overrides the configured name.
        #[arg(long)]
        pipe: Option<String>,
    },
}

/// Resolve effective pipe settings from the config file and CLI overrides.
fn pipe_settings(config_path: Option<&Path>, pipe: Option<String>) -> Result<PipeConfig> {
    let mut config = match config_path {
        Some(path) => CourierConfig::load_from_path(path)?,
        None => CourierConfig::default(),
    };
    if let Some(pipe) = pipe {
        config.pipe.name = pipe;
    }
    Ok(config.pipe)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CourierError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    match args.command {
        Command::Send {
            pipe,
            headers,
            origin,
            payload,
        } => {
            let config = pipe_settings(args.config.as_deref(), pipe)?;
            send(config, headers, origin, payload).await
        }
        Command::Listen { pipe } => {
            let config = pipe_settings(args.config.as_deref(), pipe)?;
            listen(config).await
        }
    }
}

async fn send(
    mut config: PipeConfig,
    headers: Vec<String>,
    origin: Option<String>,
    payload: String,
) -> Result<()> {
    if let Some(origin) = origin {
        config.origin_system = origin;
    }

    let mut envelope = Envelope::new(payload);
    for header in headers {
        let (key, value) = header.split_once('=').ok_or_else(|| {
            CourierError::Config(format!("invalid header '{header}', expected key=value"))
        })?;
        envelope.headers_mut().insert(key, value);
    }

    let sender = PipeSender::new(config)?;
    sender.send(envelope).await?;
    // close() drains the queue, so the message gets its connection attempt
    // before exit. Fire-and-forget: no delivery confirmation exists.
    sender.close().await
}

/// Prints each received message as one JSON line on stdout.
struct PrintHandler;

impl MessageHandler for PrintHandler {
    fn handle(&self, message: Box<dyn ReceivedMessage>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let headers: serde_json::Map<String, serde_json::Value> = message
                .headers()
                .iter()
                .map(|(key, value)| (key.to_owned(), serde_json::Value::String(value.to_owned())))
                .collect();
            let line = serde_json::json!({
                "payload": message.payload(),
                "headers": headers,
            });
            println!("{line}");
            message.acknowledge()
        })
    }
}

async fn listen(config: PipeConfig) -> Result<()> {
    let receiver = PipeReceiver::new(config);
    receiver.start(Arc::new(PrintHandler)).await?;
    info!(pipe = %receiver.name(), "listening; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| CourierError::Io(err.to_string()))?;
    receiver.close().await
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| CourierError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| CourierError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
