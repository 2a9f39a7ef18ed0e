//! Error types for the rule parsing layer.

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing edited CSS text.
///
/// These never cross the host boundary: the patch engine absorbs them as
/// per-block skips and surfaces only a count.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule block could not be parsed.
    #[error("CSS parse error: {message}")]
    Parse { message: String },

    /// A selector prelude could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// A block was cut off before its closing brace.
    #[error("Unterminated rule block: {fragment}")]
    Unterminated { fragment: String },
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an unterminated-block error. The stored fragment is truncated
    /// so log lines stay readable.
    pub fn unterminated(fragment: &str) -> Self {
        let trimmed = fragment.trim();
        let mut fragment: String = trimmed.chars().take(60).collect();
        if fragment.len() < trimmed.len() {
            fragment.push('…');
        }
        Self::Unterminated { fragment }
    }
}
