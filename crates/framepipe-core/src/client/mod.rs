//! Client driver for the framepipe protocol.
//!
//! Connects once, then for each input file: checks eligibility, reads the
//! content, sends one request frame, and waits for exactly one response
//! frame before moving on. Frames are strictly sequential on the shared
//! connection.
//!
//! Failure policy: local per-file problems (ineligible, unreadable, over
//! the format's payload cap) skip that file and continue. Connection-level
//! failures abort the whole batch — on one strictly sequential stream a
//! failed exchange leaves the session unrecoverable mid-frame.

pub mod eligibility;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::config::PipeConfig;
use crate::error::{ClientError, ClientResult, FrameError};
use crate::wire::{Frame, FrameCodec};

pub use eligibility::SkipReason;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was sent and the server responded.
    Sent { response: String },
    /// The file never reached the wire.
    Skipped { reason: SkipReason },
}

/// Per-file result of a client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The input path as given.
    pub path: PathBuf,
    /// Outcome for this file.
    pub outcome: FileOutcome,
}

/// Client that streams file contents to a framepipe server.
pub struct FileClient {
    config: PipeConfig,
}

impl FileClient {
    /// Create a client for the given configuration.
    #[must_use]
    pub fn new(config: PipeConfig) -> Self {
        Self { config }
    }

    /// Send each file over one persistent connection and collect outcomes.
    ///
    /// # Errors
    ///
    /// Returns an error on any connection-level failure: missing socket
    /// path, connection refused, transport errors mid-session, a truncated
    /// or invalid response frame, or a response timeout.
    pub async fn run(&self, files: &[PathBuf]) -> ClientResult<Vec<FileReport>> {
        let stream = self.connect().await?;
        debug!(path = %self.config.socket.path.display(), "connected");

        let codec = FrameCodec::new(self.config.wire.format)
            .with_max_frame_size(self.config.wire.max_frame_size);
        let mut framed = Framed::new(stream, codec);

        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let outcome = self.send_file(&mut framed, path).await?;
            reports.push(FileReport {
                path: path.clone(),
                outcome,
            });
        }

        Ok(reports)
    }

    async fn connect(&self) -> ClientResult<UnixStream> {
        let path = &self.config.socket.path;
        UnixStream::connect(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ClientError::SocketNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::ConnectionRefused => ClientError::Refused {
                path: path.to_path_buf(),
            },
            _ => ClientError::Io(e),
        })
    }

    /// Send one file and wait for its response frame.
    async fn send_file(
        &self,
        framed: &mut Framed<UnixStream, FrameCodec>,
        path: &Path,
    ) -> ClientResult<FileOutcome> {
        if let Some(reason) = eligibility::check(path) {
            warn!(path = %path.display(), %reason, "skipping file");
            return Ok(FileOutcome::Skipped { reason });
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                let reason = SkipReason::Unreadable {
                    message: e.to_string(),
                };
                warn!(path = %path.display(), %reason, "skipping file");
                return Ok(FileOutcome::Skipped { reason });
            }
        };

        info!(
            path = %path.display(),
            bytes = content.len(),
            "sending file contents"
        );

        if let Err(e) = framed.send(Frame::new(content)).await {
            // Cap violations are caught before any byte is written, so the
            // stream is still clean and the batch can continue.
            let reason = match e {
                FrameError::PayloadTooLarge { length, max } => {
                    SkipReason::TooLarge { length, max }
                }
                FrameError::FrameTooLarge { length, max } => SkipReason::TooLarge {
                    length: length as usize,
                    max,
                },
                other => return Err(other.into()),
            };
            warn!(path = %path.display(), %reason, "skipping file");
            return Ok(FileOutcome::Skipped { reason });
        }

        let window = Duration::from_millis(self.config.socket.response_timeout_ms);
        let response = match tokio::time::timeout(window, framed.next()).await {
            Err(_) => {
                return Err(ClientError::ResponseTimeout {
                    ms: self.config.socket.response_timeout_ms,
                })
            }
            // Server went away before answering.
            Ok(None) => return Err(FrameError::ConnectionClosed.into()),
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(Some(Ok(frame))) => frame,
        };

        debug!(bytes = response.len(), "received response");
        Ok(FileOutcome::Sent {
            response: response.into_text(),
        })
    }
}
