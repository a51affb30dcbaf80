//! Unix socket listener and server lifecycle.
//!
//! The listener owns the bound socket and runs a serial accept loop: each
//! accepted connection is handled synchronously to completion before the
//! next accept. Shutdown is cooperative, signalled over a broadcast channel
//! and observed only between connections, so an in-flight session always
//! runs to completion. On exit the socket path is unlinked.

use std::io;
use std::path::Path;

use tokio::net::UnixListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::PipeConfig;
use crate::error::{FrameError, ServerError, ServerResult};
use crate::wire::FrameCodec;

use super::connection::ConnectionHandler;

/// Unix socket listener that accepts client connections.
pub struct PipeListener {
    config: PipeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl PipeListener {
    /// Create a new listener for the given configuration.
    #[must_use]
    pub fn new(config: PipeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Get a shutdown handle to signal the listener to stop.
    ///
    /// The signal is observed between connections; a session already in
    /// progress completes first.
    #[must_use]
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run the listener, accepting connections until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound or a stale file at
    /// the socket path cannot be cleared. Per-connection errors are logged
    /// and do not stop the loop.
    pub async fn run(&self) -> ServerResult<()> {
        let socket_path = &self.config.socket.path;
        let listener = bind_socket(socket_path)?;
        info!(
            path = %socket_path.display(),
            format = %self.config.wire.format,
            "listening for incoming connections"
        );

        let codec = FrameCodec::new(self.config.wire.format)
            .with_max_frame_size(self.config.wire.max_frame_size);
        let transform = self.config.transform();

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _addr)) => {
                            debug!("accepted a new connection");
                            let handler =
                                ConnectionHandler::new(codec.clone(), transform.clone());
                            // Serial by design: the session runs to
                            // completion before the next accept, and before
                            // shutdown is observed again.
                            match handler.handle(stream).await {
                                Ok(()) => debug!("session closed"),
                                Err(FrameError::TruncatedFrame { expected, received }) => {
                                    warn!(
                                        expected,
                                        received,
                                        "client closed mid-frame, connection aborted"
                                    );
                                }
                                Err(e) => error!(error = %e, "connection error"),
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "accept error");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        remove_socket_file(socket_path);
        Ok(())
    }
}

/// Clear any stale socket file, then bind.
fn bind_socket(path: &Path) -> ServerResult<UnixListener> {
    cleanup_stale_socket(path)?;
    UnixListener::bind(path).map_err(|source| ServerError::Bind {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove an orphaned socket file left behind by a prior crashed run.
///
/// Refuses to remove anything that is not a socket: a regular file at the
/// configured path means the path is wrong, not stale.
fn cleanup_stale_socket(path: &Path) -> ServerResult<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ServerError::StaleSocket {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    {
        use std::os::unix::fs::FileTypeExt;
        if !metadata.file_type().is_socket() {
            return Err(ServerError::NotASocket {
                path: path.to_path_buf(),
            });
        }
    }

    std::fs::remove_file(path).map_err(|source| ServerError::StaleSocket {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "removed stale socket file");
    Ok(())
}

/// Unlink the socket path on shutdown so the next startup binds cleanly.
fn remove_socket_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed socket file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, "failed to remove socket file"),
    }
}
