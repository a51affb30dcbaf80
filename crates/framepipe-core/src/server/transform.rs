//! Response transforms.
//!
//! The transform is the server's business-rule hook: a pure, deterministic
//! payload-to-payload function whose output is framed exactly like the
//! input. Each wire format carries its own conventional transform, so the
//! default follows the format unless the config overrides it.

use serde::{Deserialize, Serialize};

use crate::wire::WireFormat;

/// Prefix used by the bounded format's conventional transform.
const TAGGED_PREFIX: &str = "Processed: ";

/// Deterministic payload transform applied to each request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ResponseTransform {
    /// Uppercase the payload text.
    Uppercase,
    /// Prepend a fixed tag to the payload text.
    Tagged {
        #[serde(default = "default_prefix")]
        prefix: String,
    },
}

fn default_prefix() -> String {
    TAGGED_PREFIX.to_string()
}

impl ResponseTransform {
    /// The transform conventionally paired with each wire format.
    #[must_use]
    pub fn default_for(format: WireFormat) -> Self {
        match format {
            WireFormat::Streaming => Self::Uppercase,
            WireFormat::Bounded => Self::Tagged {
                prefix: default_prefix(),
            },
        }
    }

    /// Apply the transform to a request payload.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Uppercase => input.to_uppercase(),
            Self::Tagged { prefix } => format!("{prefix}{input}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase() {
        let transform = ResponseTransform::Uppercase;
        assert_eq!(transform.apply("hello"), "HELLO");
        assert_eq!(transform.apply("MiXeD 123"), "MIXED 123");
    }

    #[test]
    fn test_tagged() {
        let transform = ResponseTransform::default_for(WireFormat::Bounded);
        assert_eq!(transform.apply("ping"), "Processed: ping");
    }

    #[test]
    fn test_deterministic() {
        let transform = ResponseTransform::Uppercase;
        assert_eq!(transform.apply("same input"), transform.apply("same input"));
    }

    #[test]
    fn test_format_defaults() {
        assert_eq!(
            ResponseTransform::default_for(WireFormat::Streaming),
            ResponseTransform::Uppercase
        );
        assert!(matches!(
            ResponseTransform::default_for(WireFormat::Bounded),
            ResponseTransform::Tagged { .. }
        ));
    }
}
