//! Text buffer implementation (Layer 0)
//!
//! Line storage with an implicit trailing terminator. Every buffer logically
//! ends with one newline that is never part of the user's text: the
//! position after it is `end`, and nothing can be inserted after it or
//! delete it. The raw mutation primitives here do no change reporting;
//! [`crate::text::tracked::TextBuffer`] wraps them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cursor::{TextPos, TextRange};
use super::index::{Index, IndexBase, Modifier, INSERT_MARK};
use super::normalize::clamp_end;
use crate::error::IndexError;

/// Read-only queries the change normaliser needs from a buffer
///
/// Positions handed to these methods are resolved first, so out-of-range
/// lines and columns are clamped rather than rejected.
pub trait TextCore {
    /// Number of lines, not counting the one that only holds the terminator
    fn line_count(&self) -> usize;

    /// Text of a line (1-based) without its newline
    fn line(&self, line: usize) -> Option<&str>;

    /// Clamp a line/column pair into the buffer
    fn resolve(&self, pos: TextPos) -> TextPos;

    /// Resolve an index expression
    fn index(&self, index: &Index) -> Result<TextPos, IndexError>;

    /// Character offset of a position, counting newlines
    fn offset_of(&self, pos: TextPos) -> usize;

    /// Position at a character offset (clamped to `end`)
    fn pos_at(&self, offset: usize) -> TextPos;

    /// Text between two positions; empty when `start >= end`
    fn get(&self, start: TextPos, end: TextPos) -> String;

    /// Position after the terminator
    fn end(&self) -> TextPos {
        TextPos::line_start(self.line_count() + 1)
    }

    /// Number of characters between two positions
    fn char_count(&self, start: TextPos, end: TextPos) -> usize {
        self.offset_of(end).saturating_sub(self.offset_of(start))
    }

    /// Length of a line in characters (0 for the terminator line)
    fn line_len(&self, line: usize) -> usize {
        self.line(line).map(|l| l.chars().count()).unwrap_or(0)
    }
}

/// Which way a mark moves when text is inserted exactly at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gravity {
    Left,
    Right,
}

/// A named position that follows the text around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub pos: TextPos,
    pub gravity: Gravity,
}

/// Simple line-vector text store with marks and a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStore {
    lines: Vec<String>,
    marks: BTreeMap<String, Mark>,
    selection: Option<TextRange>,
}

impl TextStore {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer from a string; the cursor starts at 1.0
    ///
    /// Unlike `str::lines`, a trailing newline produces a trailing empty
    /// line, because it is real text that precedes the terminator.
    pub fn from_text(text: &str) -> Self {
        let mut marks = BTreeMap::new();
        marks.insert(
            INSERT_MARK.to_string(),
            Mark {
                pos: TextPos::start(),
                gravity: Gravity::Right,
            },
        );

        Self {
            lines: text.split('\n').map(str::to_string).collect(),
            marks,
            selection: None,
        }
    }

    /// Buffer content without the terminator
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// All lines as a slice
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Total characters including the terminator
    fn total_chars(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count() + 1).sum()
    }

    /// `pos` moved one character back when it sits on `end`
    pub fn clamp_end(&self, pos: TextPos) -> TextPos {
        clamp_end(self, pos)
    }

    /// Character at a position; `'\n'` at a line end, `None` at `end`
    pub fn char_at(&self, pos: TextPos) -> Option<char> {
        let pos = self.resolve(pos);
        let line = self.lines.get(pos.line - 1)?;
        Some(line.chars().nth(pos.col).unwrap_or('\n'))
    }

    // ========== Marks ==========

    /// Position of a mark
    pub fn mark(&self, name: &str) -> Option<TextPos> {
        self.marks.get(name).map(|m| m.pos)
    }

    /// Current cursor position
    pub fn cursor(&self) -> TextPos {
        self.mark(INSERT_MARK).unwrap_or_else(TextPos::start)
    }

    /// Set (or move) a mark. New marks get right gravity.
    pub fn mark_set(&mut self, name: &str, pos: TextPos) {
        let pos = self.clamp_end(self.resolve(pos));
        self.marks
            .entry(name.to_string())
            .and_modify(|m| m.pos = pos)
            .or_insert(Mark {
                pos,
                gravity: Gravity::Right,
            });
    }

    /// Remove a mark. The cursor mark cannot be removed.
    pub fn mark_unset(&mut self, name: &str) -> bool {
        if name == INSERT_MARK {
            return false;
        }
        self.marks.remove(name).is_some()
    }

    pub fn mark_gravity(&self, name: &str) -> Option<Gravity> {
        self.marks.get(name).map(|m| m.gravity)
    }

    pub fn set_mark_gravity(&mut self, name: &str, gravity: Gravity) -> bool {
        match self.marks.get_mut(name) {
            Some(mark) => {
                mark.gravity = gravity;
                true
            }
            None => false,
        }
    }

    /// Names of all marks, sorted
    pub fn mark_names(&self) -> impl Iterator<Item = &str> {
        self.marks.keys().map(String::as_str)
    }

    // ========== Selection ==========

    pub fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    /// Select a range; an empty range clears the selection
    pub fn set_selection(&mut self, start: TextPos, end: TextPos) {
        let start = self.clamp_end(self.resolve(start));
        let end = self.clamp_end(self.resolve(end));
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.selection = (start < end).then(|| TextRange::new(start, end));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ========== Raw mutation ==========

    /// Insert text without any change reporting
    pub fn raw_insert(&mut self, pos: TextPos, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = self.clamp_end(self.resolve(pos));
        let at = self.offset_of(pos);
        let inserted = text.chars().count();
        let offsets = self.tracked_offsets();

        let row = pos.line - 1;
        let split = byte_index(&self.lines[row], pos.col);
        let tail = self.lines[row].split_off(split);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines[row].push_str(first);
        }
        let mut last_row = row;
        for piece in pieces {
            last_row += 1;
            self.lines.insert(last_row, piece.to_string());
        }
        self.lines[last_row].push_str(&tail);

        self.restore_offsets(offsets, |offset, gravity| {
            if offset > at || (offset == at && gravity == Gravity::Right) {
                offset + inserted
            } else {
                offset
            }
        });
    }

    /// Delete text without any change reporting; the terminator is never removed
    pub fn raw_delete(&mut self, start: TextPos, end: TextPos) {
        let start = self.clamp_end(self.resolve(start));
        let end = self.clamp_end(self.resolve(end));
        if start >= end {
            return;
        }
        let from = self.offset_of(start);
        let to = self.offset_of(end);
        let offsets = self.tracked_offsets();

        let (first, last) = (start.line - 1, end.line - 1);
        let tail = {
            let line = &self.lines[last];
            line[byte_index(line, end.col)..].to_string()
        };
        let cut = byte_index(&self.lines[first], start.col);
        self.lines[first].truncate(cut);
        self.lines[first].push_str(&tail);
        self.lines.drain(first + 1..=last);

        self.restore_offsets(offsets, |offset, _| {
            if offset >= to {
                offset - (to - from)
            } else if offset > from {
                from
            } else {
                offset
            }
        });
    }

    /// Replace a range; marks inside it collapse to its start first
    pub fn raw_replace(&mut self, start: TextPos, end: TextPos, text: &str) {
        let start = self.clamp_end(self.resolve(start));
        self.raw_delete(start, end);
        self.raw_insert(start, text);
    }

    /// Mark and selection offsets taken before a mutation
    fn tracked_offsets(&self) -> TrackedOffsets {
        TrackedOffsets {
            marks: self
                .marks
                .iter()
                .map(|(name, m)| (name.clone(), self.offset_of(m.pos), m.gravity))
                .collect(),
            selection: self
                .selection
                .map(|r| (self.offset_of(r.start), self.offset_of(r.end))),
        }
    }

    /// Move marks and the selection to their post-mutation positions
    fn restore_offsets(&mut self, saved: TrackedOffsets, shift: impl Fn(usize, Gravity) -> usize) {
        for (name, offset, gravity) in saved.marks {
            let pos = self.clamp_end(self.pos_at(shift(offset, gravity)));
            if let Some(mark) = self.marks.get_mut(&name) {
                mark.pos = pos;
            }
        }

        // Inserting at either boundary must not grow the selection
        self.selection = saved.selection.and_then(|(start, end)| {
            let start = shift(start, Gravity::Right);
            let end = shift(end, Gravity::Left);
            (start < end).then(|| TextRange::new(self.pos_at(start), self.pos_at(end)))
        });
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn apply_modifier(&self, pos: TextPos, modifier: Modifier) -> TextPos {
        match modifier {
            Modifier::Chars(n) => {
                let offset = (self.offset_of(pos) as i64).saturating_add(n);
                self.pos_at(offset.clamp(0, self.total_chars() as i64) as usize)
            }
            Modifier::Lines(n) => {
                // one past the last line resolves to `end`
                let last = self.line_count() as i64 + 1;
                let line = (pos.line as i64).saturating_add(n).clamp(1, last) as usize;
                self.resolve(TextPos::new(line, pos.col))
            }
            Modifier::LineStart => TextPos::line_start(pos.line),
            Modifier::LineEnd => TextPos::new(pos.line, self.line_len(pos.line)),
            Modifier::WordStart => {
                let Some(line) = self.line(pos.line) else {
                    return pos;
                };
                let chars: Vec<char> = line.chars().collect();
                let mut col = pos.col;
                if chars.get(col).copied().is_some_and(Self::is_word_char) {
                    while col > 0 && Self::is_word_char(chars[col - 1]) {
                        col -= 1;
                    }
                }
                TextPos::new(pos.line, col)
            }
            Modifier::WordEnd => {
                let Some(line) = self.line(pos.line) else {
                    return pos;
                };
                let chars: Vec<char> = line.chars().collect();
                let mut col = pos.col;
                if chars.get(col).copied().is_some_and(Self::is_word_char) {
                    while col < chars.len() && Self::is_word_char(chars[col]) {
                        col += 1;
                    }
                    TextPos::new(pos.line, col)
                } else {
                    self.apply_modifier(pos, Modifier::Chars(1))
                }
            }
        }
    }
}

struct TrackedOffsets {
    marks: Vec<(String, usize, Gravity)>,
    selection: Option<(usize, usize)>,
}

impl Default for TextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCore for TextStore {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|row| self.lines.get(row))
            .map(String::as_str)
    }

    fn resolve(&self, pos: TextPos) -> TextPos {
        if pos.line < 1 {
            return TextPos::start();
        }
        if pos.line > self.lines.len() {
            return self.end();
        }
        TextPos::new(pos.line, pos.col.min(self.line_len(pos.line)))
    }

    fn index(&self, index: &Index) -> Result<TextPos, IndexError> {
        let base = match &index.base {
            IndexBase::Pos(pos) => self.resolve(*pos),
            IndexBase::End => self.end(),
            IndexBase::Mark(name) => self
                .mark(name)
                .ok_or_else(|| IndexError::UnknownMark(name.clone()))?,
            IndexBase::SelFirst => self.selection.ok_or(IndexError::NoSelection)?.start,
            IndexBase::SelLast => self.selection.ok_or(IndexError::NoSelection)?.end,
        };

        Ok(index
            .modifiers
            .iter()
            .fold(base, |pos, modifier| self.apply_modifier(pos, *modifier)))
    }

    fn offset_of(&self, pos: TextPos) -> usize {
        let pos = self.resolve(pos);
        let before: usize = self.lines[..pos.line - 1]
            .iter()
            .map(|l| l.chars().count() + 1)
            .sum();
        before + pos.col
    }

    fn pos_at(&self, offset: usize) -> TextPos {
        let mut remaining = offset;
        for (row, line) in self.lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return TextPos::new(row + 1, remaining);
            }
            remaining -= len + 1;
        }
        self.end()
    }

    fn get(&self, start: TextPos, end: TextPos) -> String {
        let start = self.resolve(start);
        let end = self.resolve(end);
        if start >= end {
            return String::new();
        }

        let mut out = String::new();
        let last = end.line.min(self.lines.len());
        for line_no in start.line..=last {
            let line = &self.lines[line_no - 1];
            let from = if line_no == start.line { start.col } else { 0 };
            let to = if line_no == end.line {
                end.col
            } else {
                line.chars().count()
            };
            out.push_str(&line[byte_index(line, from)..byte_index(line, to)]);
            if line_no < end.line {
                out.push('\n');
            }
        }
        out
    }
}

/// Byte offset of a character column (line length when past the end)
fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = TextStore::from_text("hello world");
        assert_eq!(store.line_count(), 1);
        assert_eq!(store.line(1), Some("hello world"));
        assert_eq!(store.end(), TextPos::new(2, 0));
    }

    #[test]
    fn test_trailing_newline_is_a_line() {
        let store = TextStore::from_text("abc\n");
        assert_eq!(store.line_count(), 2);
        assert_eq!(store.line(2), Some(""));
        assert_eq!(store.text(), "abc\n");
    }

    #[test]
    fn test_clamp_end_skips_terminator() {
        let store = TextStore::from_text("ab\ncd");
        assert_eq!(store.clamp_end(store.end()), TextPos::new(2, 2));

        let empty = TextStore::new();
        assert_eq!(empty.clamp_end(empty.end()), TextPos::start());
    }

    #[test]
    fn test_resolve_clamps() {
        let store = TextStore::from_text("abc\nde");
        assert_eq!(store.resolve(TextPos::new(0, 7)), TextPos::new(1, 0));
        assert_eq!(store.resolve(TextPos::new(1, 99)), TextPos::new(1, 3));
        assert_eq!(store.resolve(TextPos::new(9, 0)), store.end());
    }

    #[test]
    fn test_offsets_round_trip() {
        let store = TextStore::from_text("héllo\nwörld");
        for offset in 0..=store.total_chars() {
            let pos = store.pos_at(offset);
            assert_eq!(store.offset_of(pos), offset);
        }
        assert_eq!(store.pos_at(6), TextPos::new(2, 0));
    }

    #[test]
    fn test_get_includes_newlines() {
        let store = TextStore::from_text("abc\ndef");
        assert_eq!(store.get(TextPos::new(1, 1), TextPos::new(2, 2)), "bc\nde");
        assert_eq!(store.get(TextPos::new(2, 0), store.end()), "def\n");
        assert_eq!(store.get(TextPos::new(2, 2), TextPos::new(1, 0)), "");
    }

    #[test]
    fn test_index_modifiers() {
        let store = TextStore::from_text("foo bar_baz\nqux");
        let at = |s: &str| store.index(&s.parse().unwrap()).unwrap();

        assert_eq!(at("end - 1 char"), TextPos::new(2, 3));
        assert_eq!(at("1.2 + 10 chars"), TextPos::new(2, 0));
        assert_eq!(at("1.5 wordstart"), TextPos::new(1, 4));
        assert_eq!(at("1.5 wordend"), TextPos::new(1, 11));
        assert_eq!(at("1.3 wordend"), TextPos::new(1, 4));
        assert_eq!(at("2.1 lineend"), TextPos::new(2, 3));
        assert_eq!(at("1.9 + 1 lines"), TextPos::new(2, 3));
        assert_eq!(at("1.0 - 5 chars"), TextPos::new(1, 0));
        assert_eq!(at("1.end"), TextPos::new(1, 11));
    }

    #[test]
    fn test_index_errors() {
        let store = TextStore::from_text("abc");
        assert_eq!(
            store.index(&Index::mark("nope")),
            Err(IndexError::UnknownMark("nope".to_string()))
        );
        assert_eq!(store.index(&Index::sel_first()), Err(IndexError::NoSelection));
    }

    #[test]
    fn test_raw_insert_multiline() {
        let mut store = TextStore::from_text("hello world");
        store.raw_insert(TextPos::new(1, 5), ",\nbig");
        assert_eq!(store.text(), "hello,\nbig world");
        assert_eq!(store.line_count(), 2);
    }

    #[test]
    fn test_raw_insert_at_end_goes_before_terminator() {
        let mut store = TextStore::from_text("abc");
        store.raw_insert(store.end(), "X");
        assert_eq!(store.text(), "abcX");
    }

    #[test]
    fn test_raw_delete_joins_lines() {
        let mut store = TextStore::from_text("abc\ndef\nghi");
        store.raw_delete(TextPos::new(1, 2), TextPos::new(3, 1));
        assert_eq!(store.text(), "abhi");
    }

    #[test]
    fn test_raw_delete_never_removes_terminator() {
        let mut store = TextStore::from_text("abc");
        store.raw_delete(TextPos::start(), store.end());
        assert_eq!(store.text(), "");
        assert_eq!(store.line_count(), 1);
    }

    #[test]
    fn test_cursor_has_right_gravity() {
        let mut store = TextStore::from_text("abc");
        store.mark_set(INSERT_MARK, TextPos::new(1, 1));
        store.raw_insert(TextPos::new(1, 1), "XY");
        assert_eq!(store.cursor(), TextPos::new(1, 3));

        store.raw_insert(TextPos::new(1, 0), "\n");
        assert_eq!(store.cursor(), TextPos::new(2, 3));
    }

    #[test]
    fn test_left_gravity_mark_stays() {
        let mut store = TextStore::from_text("abc");
        store.mark_set("anchor", TextPos::new(1, 1));
        store.set_mark_gravity("anchor", Gravity::Left);
        store.raw_insert(TextPos::new(1, 1), "XY");
        assert_eq!(store.mark("anchor"), Some(TextPos::new(1, 1)));
    }

    #[test]
    fn test_marks_collapse_into_deletion() {
        let mut store = TextStore::from_text("abcdef");
        store.mark_set(INSERT_MARK, TextPos::new(1, 4));
        store.mark_set("later", TextPos::new(1, 6));
        store.raw_delete(TextPos::new(1, 1), TextPos::new(1, 5));
        assert_eq!(store.cursor(), TextPos::new(1, 1));
        assert_eq!(store.mark("later"), Some(TextPos::new(1, 2)));
    }

    #[test]
    fn test_mark_set_at_end_is_clamped() {
        let mut store = TextStore::from_text("abc");
        store.mark_set(INSERT_MARK, store.end());
        assert_eq!(store.cursor(), TextPos::new(1, 3));
        assert!(!store.mark_unset(INSERT_MARK));
    }

    #[test]
    fn test_selection_follows_edits() {
        let mut store = TextStore::from_text("abcdef");
        store.set_selection(TextPos::new(1, 2), TextPos::new(1, 4));

        // inserting at the boundary does not extend it
        store.raw_insert(TextPos::new(1, 2), "__");
        assert_eq!(
            store.selection(),
            Some(TextRange::new(TextPos::new(1, 4), TextPos::new(1, 6)))
        );

        store.raw_delete(TextPos::new(1, 3), TextPos::new(1, 7));
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_huge_offsets_clamp() {
        let store = TextStore::from_text("abc\ndef");
        let ix = |s: &str| store.index(&s.parse().unwrap()).unwrap();

        assert_eq!(ix("1.1 + 9223372036854775807 chars"), store.end());
        assert_eq!(ix("2.1 - 9223372036854775807 chars"), TextPos::start());
        assert_eq!(ix("1.1 + 9223372036854775807 lines"), store.end());
        assert_eq!(ix("2.1 - 9223372036854775807 lines"), TextPos::new(1, 1));
    }
}
