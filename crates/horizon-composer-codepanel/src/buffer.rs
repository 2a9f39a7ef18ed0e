//! Edit buffers with apply watermarks.

/// One text buffer shown to the user, with the last-applied value kept as
/// a watermark so re-applying unchanged text is a no-op.
#[derive(Debug, Default)]
pub struct EditBuffer {
    value: String,
    watermark: Option<String>,
}

impl EditBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed value (serialization path). The watermark is
    /// untouched.
    pub fn load(&mut self, text: impl Into<String>) {
        self.value = text.into();
    }

    /// The currently displayed value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether applying this (already trimmed) text should be skipped:
    /// empty input, or identical to the last-applied value.
    pub fn is_noop(&self, trimmed: &str) -> bool {
        trimmed.is_empty() || self.watermark.as_deref() == Some(trimmed)
    }

    /// Record an applied value as the new watermark and displayed value.
    pub fn mark_applied(&mut self, text: &str) {
        self.watermark = Some(text.to_string());
        self.value = text.to_string();
    }
}

/// The HTML/CSS buffer pair. The CSS buffer does not exist when CSS is
/// serialized inline into the HTML.
#[derive(Debug)]
pub struct EditBuffers {
    /// The HTML buffer.
    pub html: EditBuffer,
    /// The CSS buffer, absent under the `inline_css` option.
    pub css: Option<EditBuffer>,
}

impl EditBuffers {
    /// Create the buffer pair for the given mode.
    pub fn new(inline_css: bool) -> Self {
        Self {
            html: EditBuffer::new(),
            css: (!inline_css).then(EditBuffer::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_noop() {
        let buffer = EditBuffer::new();
        assert!(buffer.is_noop(""));
        assert!(!buffer.is_noop(".a { }"));
    }

    #[test]
    fn watermark_detects_reapply() {
        let mut buffer = EditBuffer::new();
        assert!(!buffer.is_noop(".a { color: red; }"));
        buffer.mark_applied(".a { color: red; }");
        assert!(buffer.is_noop(".a { color: red; }"));
        assert!(!buffer.is_noop(".a { color: blue; }"));
    }

    #[test]
    fn load_does_not_touch_watermark() {
        let mut buffer = EditBuffer::new();
        buffer.mark_applied("x");
        buffer.load("y");
        assert_eq!(buffer.value(), "y");
        assert!(buffer.is_noop("x"));
    }

    #[test]
    fn inline_mode_has_no_css_buffer() {
        assert!(EditBuffers::new(true).css.is_none());
        assert!(EditBuffers::new(false).css.is_some());
    }
}
