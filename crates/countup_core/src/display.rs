//! Display target contract
//!
//! The only thing a counter touches on its target is the rendered text.

use std::cell::RefCell;

/// A text element a counter renders into
pub trait DisplayTarget {
    /// Replace the displayed text
    fn set_text(&self, text: &str);

    /// Currently displayed text
    fn text(&self) -> String;
}

/// In-memory display target
///
/// Records every write so hosts and tests can inspect the rendered sequence.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: RefCell<String>,
    history: RefCell<Vec<String>>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that already displays `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: RefCell::new(text.into()),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Number of `set_text` calls so far
    pub fn write_count(&self) -> usize {
        self.history.borrow().len()
    }

    /// Every text written so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}

impl DisplayTarget for TextBuffer {
    fn set_text(&self, text: &str) {
        let mut current = self.text.borrow_mut();
        current.clear();
        current.push_str(text);
        self.history.borrow_mut().push(text.to_string());
    }

    fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_buffer_writes() {
        let buffer = TextBuffer::with_text("1,000");
        assert_eq!(buffer.text(), "1,000");
        assert_eq!(buffer.write_count(), 0);

        buffer.set_text("42");
        buffer.set_text("43");
        assert_eq!(buffer.text(), "43");
        assert_eq!(buffer.write_count(), 2);
        assert_eq!(buffer.history(), vec!["42", "43"]);
    }
}
