//! Client-side file eligibility.
//!
//! The server only processes text, so the client gates each input file
//! before it reaches the wire: the file must exist, and its guessed MIME
//! category must be absent or `text/*`, or its name must end in a
//! recognized script suffix. The decision is computed fresh per file.

use std::fmt;
use std::path::Path;

/// Extensions allowed through regardless of their guessed MIME type.
const SCRIPT_SUFFIXES: &[&str] = &["sh"];

/// Why a file was skipped instead of sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No regular file at the given path.
    NotFound,
    /// Guessed content category is neither absent nor text.
    UnsupportedType { mime: String },
    /// The file exists but its contents could not be read as text.
    Unreadable { message: String },
    /// The payload does not fit the wire format's cap.
    TooLarge { length: usize, max: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::UnsupportedType { mime } => write!(f, "unsupported file type ({mime})"),
            Self::Unreadable { message } => write!(f, "unreadable: {message}"),
            Self::TooLarge { length, max } => {
                write!(f, "payload of {length} bytes exceeds the {max}-byte limit")
            }
        }
    }
}

/// Decide whether a file may be sent. `None` means eligible.
#[must_use]
pub fn check(path: &Path) -> Option<SkipReason> {
    if !path.is_file() {
        return Some(SkipReason::NotFound);
    }

    let Some(mime) = mime_guess::from_path(path).first() else {
        // No guess at all: treat as plain text.
        return None;
    };

    if mime.type_() == mime_guess::mime::TEXT {
        return None;
    }

    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_SUFFIXES.contains(&ext));
    if is_script {
        return None;
    }

    Some(SkipReason::UnsupportedType {
        mime: mime.essence_str().to_string(),
    })
}
