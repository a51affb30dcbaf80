//! Wire layer for the framepipe protocol.
//!
//! This module provides:
//! - The length-prefixed frame codec
//! - The wire format policy (streaming vs. bounded)

pub mod codec;
pub mod format;

pub use codec::{Frame, FrameCodec, DEFAULT_MAX_FRAME_SIZE};
pub use format::{WireFormat, BOUNDED_MAX_PAYLOAD};
