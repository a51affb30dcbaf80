//! Wire format policy.
//!
//! Both formats share the same frame shape (length header, then payload) and
//! differ only in header width and payload cap. Modeling the difference as a
//! policy enum keeps one codec implementation serving both wire contracts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Header width of the streaming format: 8-byte big-endian `u64`.
pub const STREAMING_HEADER_LEN: usize = 8;

/// Header width of the bounded format: a single length byte.
pub const BOUNDED_HEADER_LEN: usize = 1;

/// Largest payload the bounded format's 1-byte header can announce.
pub const BOUNDED_MAX_PAYLOAD: usize = 255;

/// Length-header policy for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// 8-byte length header, payload of arbitrary size.
    #[default]
    Streaming,
    /// 1-byte length header, payload capped at 255 bytes, single-shot.
    Bounded,
}

impl WireFormat {
    /// Width of the length header in bytes.
    #[must_use]
    pub const fn header_len(self) -> usize {
        match self {
            Self::Streaming => STREAMING_HEADER_LEN,
            Self::Bounded => BOUNDED_HEADER_LEN,
        }
    }

    /// Hard payload cap imposed by the header width itself.
    ///
    /// The streaming format has no header-imposed cap; the codec's
    /// max-frame-size guard bounds it instead.
    #[must_use]
    pub const fn header_payload_cap(self) -> u64 {
        match self {
            Self::Streaming => u64::MAX,
            Self::Bounded => BOUNDED_MAX_PAYLOAD as u64,
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Streaming => f.write_str("streaming"),
            Self::Bounded => f.write_str("bounded"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "streaming" => Ok(Self::Streaming),
            "bounded" => Ok(Self::Bounded),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}
