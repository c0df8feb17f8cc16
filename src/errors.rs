//! Error types shared across the library.

use std::fmt::{Display, Formatter};

/// Shared library result type.
pub type Result<T> = std::result::Result<T, CourierError>;

/// Library error enumeration covering all transport failure modes.
#[derive(Debug)]
pub enum CourierError {
    /// Malformed wire text encountered while decoding an envelope.
    Decode(String),
    /// Could not connect to the destination pipe (no listener / timeout).
    Connect(String),
    /// Pipe read, write, or listener failure.
    Transport(String),
    /// User message handler returned an error or panicked.
    Handler(String),
    /// Operation attempted on a closed or disposed component.
    Closed(String),
    /// `start` invoked on a receiver that is already listening.
    AlreadyStarted(String),
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for CourierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "decode: {msg}"),
            Self::Connect(msg) => write!(f, "connect: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Handler(msg) => write!(f, "handler: {msg}"),
            Self::Closed(msg) => write!(f, "closed: {msg}"),
            Self::AlreadyStarted(msg) => write!(f, "already started: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for CourierError {}

impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
