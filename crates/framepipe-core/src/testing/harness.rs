//! Test harness for integration testing against a live server.
//!
//! Spawns a real [`PipeListener`] on a socket path inside a fresh temp
//! directory and hands out framed client connections. A harness dropped
//! without [`PipeTestHarness::shutdown`] leaves the server task to die with
//! the test runtime.

use std::path::Path;
use std::time::Duration;

use tokio::net::UnixStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use crate::config::PipeConfig;
use crate::error::ServerResult;
use crate::server::PipeListener;
use crate::wire::{FrameCodec, WireFormat};

/// A running server plus everything needed to talk to it.
pub struct PipeTestHarness {
    config: PipeConfig,
    shutdown: broadcast::Sender<()>,
    server: JoinHandle<ServerResult<()>>,
    _dir: tempfile::TempDir,
}

impl PipeTestHarness {
    /// Spawn a server speaking the given wire format with default settings.
    pub async fn new(format: WireFormat) -> Self {
        let mut config = PipeConfig::default();
        config.wire.format = format;
        Self::with_config(config).await
    }

    /// Spawn a server with a custom configuration.
    ///
    /// The socket path is always replaced with one inside a fresh temp
    /// directory so parallel tests never collide.
    pub async fn with_config(mut config: PipeConfig) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        config.socket.path = dir.path().join("framepipe.sock");

        let listener = PipeListener::new(config.clone());
        let shutdown = listener.shutdown_handle();
        let server = tokio::spawn(async move { listener.run().await });

        wait_for_socket(&config.socket.path).await;

        Self {
            config,
            shutdown,
            server,
            _dir: dir,
        }
    }

    /// The socket path the server is listening on.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.config.socket.path
    }

    /// A copy of the server's configuration, suitable for building a client.
    #[must_use]
    pub fn config(&self) -> PipeConfig {
        self.config.clone()
    }

    /// Open a framed connection to the server.
    pub async fn connect(&self) -> Framed<UnixStream, FrameCodec> {
        let stream = UnixStream::connect(&self.config.socket.path)
            .await
            .expect("connect to test server");
        let codec = FrameCodec::new(self.config.wire.format)
            .with_max_frame_size(self.config.wire.max_frame_size);
        Framed::new(stream, codec)
    }

    /// Open a raw (unframed) connection, for wire-level assertions.
    pub async fn connect_raw(&self) -> UnixStream {
        UnixStream::connect(&self.config.socket.path)
            .await
            .expect("connect to test server")
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(self) -> ServerResult<()> {
        let _ = self.shutdown.send(());
        self.server.await.expect("server task panicked")
    }
}

/// Poll until the server has bound its socket.
async fn wait_for_socket(path: &Path) {
    for _ in 0..200 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("server did not bind {} in time", path.display());
}
