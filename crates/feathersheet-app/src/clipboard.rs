/// Process-wide text buffer used for copy and paste
pub trait ClipboardProvider {
    fn get_text(&self) -> String;
    fn set_text(&mut self, text: String);
}

/// Clipboard kept in memory, for headless sessions and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: String,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.get_text(), "");

        clipboard.set_text("a\tb".to_string());
        assert_eq!(clipboard.get_text(), "a\tb");

        let clipboard = MemoryClipboard::with_text("x");
        assert_eq!(clipboard.get_text(), "x");
    }
}
