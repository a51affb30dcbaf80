//! Framepipe Core Library
//!
//! Core functionality for a length-prefixed message protocol over a Unix
//! domain socket: a client streams file contents to a server, which applies
//! a deterministic transform and echoes a response, one frame at a time.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Domain-specific error types
//! - [`wire`] - Frame codec and wire format policy
//! - [`server`] - Unix socket listener, session handler, response transform
//! - [`client`] - Client driver and file eligibility
//!
//! # Example
//!
//! ```rust,ignore
//! use framepipe_core::config::PipeConfig;
//! use framepipe_core::server::PipeListener;
//!
//! let config = PipeConfig::from_file("framepipe.yaml")?;
//! let listener = PipeListener::new(config);
//! listener.run().await?;
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod wire;

/// Test utilities for integration testing.
///
/// This module is only available when compiling tests or when the `testing`
/// feature is enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use client::{FileClient, FileOutcome, FileReport};
pub use config::{LoggingConfig, PipeConfig, SocketConfig, WireConfig};
pub use error::{ClientError, ConfigError, FrameError, ServerError};
pub use server::{ConnectionHandler, PipeListener, ResponseTransform};
pub use wire::{Frame, FrameCodec, WireFormat};
