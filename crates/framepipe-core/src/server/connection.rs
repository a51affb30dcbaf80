//! Per-connection session handler.
//!
//! Drives one accepted connection through the request/response loop:
//! read one frame, apply the transform, write one frame back, repeat until
//! the peer closes or an error occurs. Frames strictly alternate; the
//! handler never reads a second request before the previous response has
//! been flushed.

use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::error::FrameResult;
use crate::wire::{Frame, FrameCodec};

use super::transform::ResponseTransform;

/// Handles the session on a single client connection.
pub struct ConnectionHandler {
    codec: FrameCodec,
    transform: ResponseTransform,
}

impl ConnectionHandler {
    /// Create a handler with the codec and transform to apply.
    #[must_use]
    pub fn new(codec: FrameCodec, transform: ResponseTransform) -> Self {
        Self { codec, transform }
    }

    /// Run the session to completion.
    ///
    /// A peer close at a frame boundary is the normal end of session and
    /// returns `Ok`. The stream is shut down on every exit path; close-time
    /// errors are reported but never escalate.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame fails to decode, a response fails to
    /// encode, or the transport fails mid-session.
    pub async fn handle(self, stream: UnixStream) -> FrameResult<()> {
        let mut framed = Framed::new(stream, self.codec);

        let result = Self::session_loop(&self.transform, &mut framed).await;

        if let Err(e) = framed.get_mut().shutdown().await {
            warn!(error = %e, "error closing connection");
        }

        result
    }

    async fn session_loop(
        transform: &ResponseTransform,
        framed: &mut Framed<UnixStream, FrameCodec>,
    ) -> FrameResult<()> {
        while let Some(next) = framed.next().await {
            let frame = next?;
            debug!(bytes = frame.len(), "received request");

            let response = transform.apply(frame.text());

            framed.send(Frame::new(response)).await?;
            debug!("response sent");
        }

        // Zero-byte read at the frame-header boundary: the peer has sent
        // everything it had and is done.
        debug!("peer ended session");
        Ok(())
    }
}
