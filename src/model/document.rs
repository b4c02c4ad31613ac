//! Resolved document types consumed by the planner.

use serde::{Deserialize, Serialize};

/// A document to lay out: the sets of one gig, already resolved to entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Display name, used in page footers
    pub name: String,

    /// Sets in performance order
    pub sets: Vec<SetEntries>,
}

impl Document {
    /// Create an empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: Vec::new(),
        }
    }

    /// Append a set.
    pub fn add_set(&mut self, set: SetEntries) {
        self.sets.push(set);
    }

    /// Builder-style variant of [`Document::add_set`].
    pub fn with_set(mut self, set: SetEntries) -> Self {
        self.sets.push(set);
        self
    }

    /// Iterate over every entry in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sets.iter().flat_map(|s| s.entries.iter())
    }

    /// Number of entries that could not be resolved to an image.
    pub fn error_count(&self) -> usize {
        self.entries().filter(|e| e.is_error()).count()
    }

    /// Total number of entries.
    pub fn entry_count(&self) -> usize {
        self.sets.iter().map(|s| s.entries.len()).sum()
    }
}

/// A named, ordered group of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetEntries {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl SetEntries {
    /// Create an empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Builder-style variant of [`SetEntries::push`].
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// One line item of a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    /// A song image to place
    Image(ImageEntry),

    /// A visible placeholder for a song that could not be resolved
    Error(ErrorEntry),
}

impl Entry {
    /// Create an image entry.
    pub fn image(source: impl Into<String>, width_px: u32, height_px: u32) -> Self {
        Entry::Image(ImageEntry {
            source: source.into(),
            width_px,
            height_px,
        })
    }

    /// Create an error entry.
    pub fn error(message: impl Into<String>) -> Self {
        Entry::Error(ErrorEntry {
            message: message.into(),
        })
    }

    /// Check if this is an error placeholder.
    pub fn is_error(&self) -> bool {
        matches!(self, Entry::Error(_))
    }
}

/// A resolved, decoded song image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Key of the prepared image in the asset store (its resolved path)
    pub source: String,

    /// Width in pixels after cropping
    pub width_px: u32,

    /// Height in pixels after cropping
    pub height_px: u32,
}

/// A song reference that could not be turned into an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_counts() {
        let doc = Document::new("Friday")
            .with_set(
                SetEntries::new("Set 1")
                    .with_entry(Entry::image("a.png", 100, 200))
                    .with_entry(Entry::error("No configuration found for song 'x'")),
            )
            .with_set(SetEntries::new("Set 2").with_entry(Entry::image("b.png", 10, 10)));

        assert_eq!(doc.entry_count(), 3);
        assert_eq!(doc.error_count(), 1);
        assert_eq!(doc.entries().count(), 3);
    }

    #[test]
    fn test_entry_serialization_is_tagged() {
        let json = serde_json::to_string(&Entry::error("oops")).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"oops"}"#);
    }
}
