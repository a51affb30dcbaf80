//! Frame codec for the framepipe wire protocol.
//!
//! Implements tokio's `Decoder` and `Encoder` traits for length-prefixed
//! text frames. The framing is symmetric for requests and responses:
//! a fixed-width length header (big-endian) followed by the payload bytes,
//! with no delimiters. The header width and payload cap come from the
//! configured [`WireFormat`].

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::FrameError;

use super::format::{WireFormat, BOUNDED_MAX_PAYLOAD};

/// Default maximum frame size for the streaming format (64 MiB).
///
/// The streaming header can announce any `u64` length; the guard keeps a
/// corrupt or hostile header from triggering an absurd allocation.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// One length-prefixed unit of payload text on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
}

impl Frame {
    /// Create a frame from payload text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The payload text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the frame, returning the payload text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Payload length in bytes (the value the length header carries).
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Codec for framepipe wire frames.
///
/// Frames are encoded as:
/// - streaming: 8 bytes big-endian length, then N payload bytes
/// - bounded: 1 length byte, then up to 255 payload bytes
///
/// A frame is observable only once the header and the complete payload have
/// arrived; short reads accumulate in the buffer until then.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    format: WireFormat,
    max_frame_size: usize,
}

impl FrameCodec {
    /// Create a codec for the given wire format with the default guard.
    #[must_use]
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Override the streaming max-frame-size guard.
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// The wire format this codec speaks.
    #[must_use]
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Read the length header without consuming it.
    ///
    /// Callers must ensure `src` holds at least `header_len` bytes.
    fn peek_length(&self, src: &BytesMut) -> u64 {
        match self.format {
            WireFormat::Streaming => u64::from_be_bytes([
                src[0], src[1], src[2], src[3], src[4], src[5], src[6], src[7],
            ]),
            WireFormat::Bounded => u64::from(src[0]),
        }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        let header_len = self.format.header_len();

        if src.len() < header_len {
            return Ok(None);
        }

        let length = self.peek_length(src);
        if length > self.max_frame_size as u64 {
            return Err(FrameError::FrameTooLarge {
                length,
                max: self.max_frame_size,
            });
        }
        let length = length as usize;

        if src.len() < header_len + length {
            // Reserve space for the full frame; short reads accumulate here.
            src.reserve(header_len + length - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        let payload = src.split_to(length);

        let text = std::str::from_utf8(&payload)?.to_owned();
        Ok(Some(Frame::new(text)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            // EOF at a frame boundary is the peer's normal end of session.
            None if src.is_empty() => Ok(None),
            None => {
                let header_len = self.format.header_len();
                if src.len() < header_len {
                    return Err(FrameError::TruncatedFrame {
                        expected: header_len,
                        received: src.len(),
                    });
                }
                Err(FrameError::TruncatedFrame {
                    expected: self.peek_length(src) as usize,
                    received: src.len() - header_len,
                })
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        let payload = frame.text.as_bytes();
        let length = payload.len();

        // Caps are checked before any byte is written: a frame either goes
        // out whole or not at all.
        match self.format {
            WireFormat::Bounded if length > BOUNDED_MAX_PAYLOAD => {
                return Err(FrameError::PayloadTooLarge {
                    length,
                    max: BOUNDED_MAX_PAYLOAD,
                });
            }
            WireFormat::Streaming if length > self.max_frame_size => {
                return Err(FrameError::FrameTooLarge {
                    length: length as u64,
                    max: self.max_frame_size,
                });
            }
            _ => {}
        }

        dst.reserve(self.format.header_len() + length);
        match self.format {
            WireFormat::Streaming => dst.put_u64(length as u64),
            WireFormat::Bounded => dst.put_u8(length as u8),
        }
        dst.extend_from_slice(payload);

        Ok(())
    }
}
