//! Clipboard access for copy and paste.
//!
//! The payload is a JSON array of item property trees. The host supplies
//! the system clipboard through [`Clipboard`]; [`MemoryClipboard`] keeps the
//! text in process.

use crate::error::PropertiesError;
use crate::properties::ItemProperties;

/// Text clipboard provided by the host.
pub trait Clipboard {
    fn set_text(&mut self, text: String);
    fn text(&self) -> Option<String>;
}

/// In-process clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }
}

/// Encode copied items for the clipboard.
pub fn encode(items: &[ItemProperties]) -> Result<String, PropertiesError> {
    ItemProperties::list_to_json(items)
}

/// Decode a clipboard payload.
pub fn decode(text: &str) -> Result<Vec<ItemProperties>, PropertiesError> {
    ItemProperties::list_from_json(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Item, Line};
    use kurbo::Point;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.text(), None);
        clipboard.set_text("[]".to_string());
        assert_eq!(clipboard.text().as_deref(), Some("[]"));
    }

    #[test]
    fn test_payload_roundtrip() {
        let line: Item = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)).into();
        let text = encode(&[line.properties()]).unwrap();
        let items = decode(&text).unwrap();
        assert_eq!(items, vec![line.properties()]);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"[{"type": "spline"}]"#).is_err());
    }
}
