//! Domain error types for the framepipe protocol.
//!
//! Uses `thiserror` for ergonomic error definitions with proper context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors related to configuration parsing and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Wire format name not recognized.
    #[error("unknown wire format '{0}' (expected 'streaming' or 'bounded')")]
    UnknownFormat(String),

    /// Max frame size must be large enough to hold any bounded payload.
    #[error("max_frame_size must be at least 255, got {0}")]
    MaxFrameSizeTooSmall(usize),
}

/// Errors raised by the frame codec and per-connection I/O.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Transport-level I/O failure (reset, broken pipe, ...).
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer ended the session at a frame boundary. Normal, not a fault.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Peer closed the stream mid-frame.
    #[error("truncated frame: expected {expected} payload bytes, received {received}")]
    TruncatedFrame { expected: usize, received: usize },

    /// Payload bytes are not valid UTF-8 text.
    #[error("payload is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Payload exceeds the bounded format's 1-byte length header.
    #[error("payload length {length} exceeds the bounded format limit of {max} bytes")]
    PayloadTooLarge { length: usize, max: usize },

    /// Announced frame length exceeds the configured guard.
    #[error("frame length {length} exceeds maximum {max}")]
    FrameTooLarge { length: u64, max: usize },
}

/// Errors that occur while running the server.
///
/// Setup variants (`StaleSocket`, `NotASocket`, `Bind`) are fatal: the
/// process exits. Frame and I/O variants terminate one connection while the
/// accept loop continues.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failed to remove a stale socket file left by a prior run.
    #[error("failed to remove stale socket '{}': {source}", path.display())]
    StaleSocket {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Something that is not a socket occupies the configured path.
    #[error("path '{}' exists but is not a socket", path.display())]
    NotASocket { path: PathBuf },

    /// Failed to bind the listening socket.
    #[error("failed to bind socket '{}': {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Per-connection framing failure.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Transport-level failure on the listening socket.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a client invocation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No socket file at the configured path.
    #[error("socket '{}' does not exist (is the server running?)", path.display())]
    SocketNotFound { path: PathBuf },

    /// Socket file exists but nothing is listening.
    #[error("connection refused at '{}' (is the server running?)", path.display())]
    Refused { path: PathBuf },

    /// Server did not respond within the configured window.
    #[error("timed out after {ms} ms waiting for a response")]
    ResponseTimeout { ms: u64 },

    /// Framing failure on the request/response stream.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Transport-level failure while connecting.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for frame codec operations.
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Result type alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
