//! Positions, ranges and cursor tracking
//!
//! Lines are 1-based and columns 0-based, both counted in characters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// A position in text (line, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPos {
    pub line: usize,
    pub col: usize,
}

impl TextPos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Create a position at the start of a line
    pub fn line_start(line: usize) -> Self {
        Self { line, col: 0 }
    }

    /// The first position of every buffer (1.0)
    pub fn start() -> Self {
        Self { line: 1, col: 0 }
    }

    /// Where this position lands once `removed` has been deleted.
    ///
    /// `removed` must end at or before `self`.
    pub fn after_removal(self, removed: TextRange) -> TextPos {
        debug_assert!(removed.end <= self);
        if self.line == removed.end.line {
            TextPos::new(
                removed.start.line,
                removed.start.col + (self.col - removed.end.col),
            )
        } else {
            TextPos::new(self.line - (removed.end.line - removed.start.line), self.col)
        }
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.col)
    }
}

/// A range of text from start (inclusive) to end (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPos,
    pub end: TextPos,
}

impl TextRange {
    pub fn new(start: TextPos, end: TextPos) -> Self {
        Self { start, end }
    }

    /// Build a range from externally supplied endpoints, rejecting inverted ones
    pub fn checked(start: TextPos, end: TextPos) -> Result<Self, EditError> {
        if start > end {
            return Err(EditError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a range covering a single character on one line
    pub fn single_char(pos: TextPos) -> Self {
        Self {
            start: pos,
            end: TextPos::new(pos.line, pos.col + 1),
        }
    }

    /// Check if this range is empty (start == end)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this range is on a single line
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Check if a position is contained within this range
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end
    }

    /// True if `other` (starting at or after `self.start`) overlaps or touches this range
    pub fn reaches(&self, other: &TextRange) -> bool {
        self.end >= other.start
    }

    /// Smallest range covering both
    pub fn union(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Outcome of comparing the cursor against the last reported position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorUpdate {
    Stable,
    /// The cursor moved; carries the new position. Collapses back to
    /// `Stable` as soon as it has been reported.
    JustMoved(TextPos),
}

/// Remembers the last cursor position that observers were told about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorTracker {
    last: TextPos,
}

impl CursorTracker {
    pub fn new(pos: TextPos) -> Self {
        Self { last: pos }
    }

    /// Last position reported to observers
    pub fn position(&self) -> TextPos {
        self.last
    }

    /// Compare the (already clamped) cursor position with the recorded one
    pub fn observe(&mut self, pos: TextPos) -> CursorUpdate {
        if pos == self.last {
            CursorUpdate::Stable
        } else {
            self.last = pos;
            CursorUpdate::JustMoved(pos)
        }
    }
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new(TextPos::start())
    }
}
