//! Change records reported after every mutation
//!
//! A [`ChangeBatch`] is replayed in listed order: each change's positions
//! refer to the document as it is once every earlier change of the batch
//! has been applied. For a single-range edit that is simply the document
//! before the edit.

use serde::{Deserialize, Serialize};

use super::cursor::{TextPos, TextRange};

/// The text between `start` and `end` (`old_length` characters) was
/// replaced by `new_text`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    pub start: TextPos,
    pub end: TextPos,
    pub old_length: usize,
    pub new_text: String,
}

impl Change {
    pub fn new(start: TextPos, end: TextPos, old_length: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            old_length,
            new_text: new_text.into(),
        }
    }

    /// A change that removes nothing and inserts nothing
    pub fn is_noop(&self) -> bool {
        self.start == self.end && self.old_length == 0 && self.new_text.is_empty()
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }
}

/// Ordered changes produced by one command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeBatch {
    changes: Vec<Change>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_vec(self) -> Vec<Change> {
        self.changes
    }

    /// Drop changes that do nothing
    pub fn retain_effective(&mut self) {
        self.changes.retain(|c| !c.is_noop());
    }

    /// Replay the batch on a copy of the pre-command text
    pub fn apply_to(&self, text: &str) -> String {
        let mut doc = text.to_string();
        for change in &self.changes {
            let start = byte_offset(&doc, change.start);
            let end = byte_offset(&doc, change.end).max(start);
            doc.replace_range(start..end, &change.new_text);
        }
        doc
    }
}

impl From<Vec<Change>> for ChangeBatch {
    fn from(changes: Vec<Change>) -> Self {
        Self { changes }
    }
}

impl Extend<Change> for ChangeBatch {
    fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
        self.changes.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ChangeBatch {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeBatch {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Byte offset of a line/column position in plain text (clamped)
fn byte_offset(text: &str, pos: TextPos) -> usize {
    let mut line_start = 0;
    for (row, line) in text.split('\n').enumerate() {
        if row + 1 == pos.line {
            let col = line
                .char_indices()
                .nth(pos.col)
                .map(|(b, _)| b)
                .unwrap_or(line.len());
            return line_start + col;
        }
        line_start += line.len() + 1;
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_detection() {
        let p = TextPos::new(1, 2);
        assert!(Change::new(p, p, 0, "").is_noop());
        assert!(!Change::new(p, p, 0, "x").is_noop());
        assert!(!Change::new(p, TextPos::new(1, 3), 1, "").is_noop());
    }

    #[test]
    fn test_retain_effective() {
        let p = TextPos::new(1, 0);
        let mut batch = ChangeBatch::from(vec![
            Change::new(p, p, 0, ""),
            Change::new(p, p, 0, "a"),
        ]);
        batch.retain_effective();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.changes()[0].new_text, "a");
    }

    #[test]
    fn test_apply_replace() {
        let batch = ChangeBatch::from(vec![Change::new(
            TextPos::new(1, 0),
            TextPos::new(1, 5),
            5,
            "toot",
        )]);
        assert_eq!(batch.apply_to("hello world"), "toot world");
    }

    #[test]
    fn test_apply_is_sequential() {
        // "abc\ndef": delete "b", then (in the shortened text) "de"
        let batch = ChangeBatch::from(vec![
            Change::new(TextPos::new(1, 1), TextPos::new(1, 2), 1, ""),
            Change::new(TextPos::new(2, 0), TextPos::new(2, 2), 2, ""),
        ]);
        assert_eq!(batch.apply_to("abc\ndef"), "ac\nf");
    }

    #[test]
    fn test_serializes_as_list() {
        let batch = ChangeBatch::from(vec![Change::new(
            TextPos::new(1, 0),
            TextPos::new(1, 0),
            0,
            "x",
        )]);
        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["new_text"], "x");
        assert_eq!(json[0]["start"]["line"], 1);
    }
}
