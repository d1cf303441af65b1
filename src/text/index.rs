//! Index expressions
//!
//! Callers address text the way the editing surface does: a base (`3.4`,
//! `end`, a mark such as `insert`, `sel.first`) followed by modifiers
//! (`+ 2 chars`, `- 1 lines`, `linestart`, `wordend`, ...). Expressions are
//! resolved against a buffer by [`crate::text::buffer::TextCore::index`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::text::cursor::TextPos;

/// Name of the mark that holds the cursor
pub const INSERT_MARK: &str = "insert";

/// Where an index expression starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexBase {
    /// A line/column pair; resolution clamps it into the buffer
    Pos(TextPos),
    /// The position after the trailing terminator
    End,
    /// A named mark
    Mark(String),
    SelFirst,
    SelLast,
}

/// Adjustment applied to a resolved base, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    Chars(i64),
    Lines(i64),
    LineStart,
    LineEnd,
    WordStart,
    WordEnd,
}

/// A position-like token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub base: IndexBase,
    pub modifiers: Vec<Modifier>,
}

impl Index {
    fn from_base(base: IndexBase) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    pub fn pos(line: usize, col: usize) -> Self {
        Self::from_base(IndexBase::Pos(TextPos::new(line, col)))
    }

    pub fn end() -> Self {
        Self::from_base(IndexBase::End)
    }

    /// The cursor mark
    pub fn insert() -> Self {
        Self::mark(INSERT_MARK)
    }

    pub fn mark(name: impl Into<String>) -> Self {
        Self::from_base(IndexBase::Mark(name.into()))
    }

    pub fn sel_first() -> Self {
        Self::from_base(IndexBase::SelFirst)
    }

    pub fn sel_last() -> Self {
        Self::from_base(IndexBase::SelLast)
    }

    fn with(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn chars(self, count: i64) -> Self {
        self.with(Modifier::Chars(count))
    }

    pub fn lines(self, count: i64) -> Self {
        self.with(Modifier::Lines(count))
    }

    pub fn linestart(self) -> Self {
        self.with(Modifier::LineStart)
    }

    pub fn lineend(self) -> Self {
        self.with(Modifier::LineEnd)
    }

    pub fn wordstart(self) -> Self {
        self.with(Modifier::WordStart)
    }

    pub fn wordend(self) -> Self {
        self.with(Modifier::WordEnd)
    }
}

impl From<TextPos> for Index {
    fn from(pos: TextPos) -> Self {
        Self::from_base(IndexBase::Pos(pos))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            IndexBase::Pos(pos) if pos.col == usize::MAX => write!(f, "{}.end", pos.line)?,
            IndexBase::Pos(pos) => write!(f, "{}", pos)?,
            IndexBase::End => f.write_str("end")?,
            IndexBase::Mark(name) => f.write_str(name)?,
            IndexBase::SelFirst => f.write_str("sel.first")?,
            IndexBase::SelLast => f.write_str("sel.last")?,
        }
        for modifier in &self.modifiers {
            match modifier {
                Modifier::Chars(n) if *n < 0 => write!(f, " - {} chars", n.unsigned_abs())?,
                Modifier::Chars(n) => write!(f, " + {} chars", n)?,
                Modifier::Lines(n) if *n < 0 => write!(f, " - {} lines", n.unsigned_abs())?,
                Modifier::Lines(n) => write!(f, " + {} lines", n)?,
                Modifier::LineStart => f.write_str(" linestart")?,
                Modifier::LineEnd => f.write_str(" lineend")?,
                Modifier::WordStart => f.write_str(" wordstart")?,
                Modifier::WordEnd => f.write_str(" wordend")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Index {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IndexError::Malformed(s.to_string());
        let text = s.trim();

        let base_len = text
            .find(|c: char| c.is_whitespace() || c == '+' || c == '-')
            .unwrap_or(text.len());
        let (base_text, mut rest) = text.split_at(base_len);
        let base = parse_base(base_text).ok_or_else(malformed)?;

        let mut modifiers = Vec::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let sign = match rest.as_bytes()[0] {
                b'+' => Some(1),
                b'-' => Some(-1),
                _ => None,
            };

            if let Some(sign) = sign {
                rest = rest[1..].trim_start();
                let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                let count: i64 = rest[..digits].parse().map_err(|_| malformed())?;
                rest = rest[digits..].trim_start();
                let (unit, after) = take_word(rest);
                rest = after;
                modifiers.push(match unit {
                    "c" | "ch" | "char" | "chars" => Modifier::Chars(sign * count),
                    "l" | "line" | "lines" => Modifier::Lines(sign * count),
                    _ => return Err(malformed()),
                });
            } else {
                let (word, after) = take_word(rest);
                rest = after;
                modifiers.push(match word {
                    "linestart" => Modifier::LineStart,
                    "lineend" => Modifier::LineEnd,
                    "wordstart" => Modifier::WordStart,
                    "wordend" => Modifier::WordEnd,
                    _ => return Err(malformed()),
                });
            }
        }

        Ok(Index { base, modifiers })
    }
}

fn take_word(s: &str) -> (&str, &str) {
    let len = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    s.split_at(len)
}

fn parse_base(text: &str) -> Option<IndexBase> {
    match text {
        "" => return None,
        "end" => return Some(IndexBase::End),
        "sel.first" => return Some(IndexBase::SelFirst),
        "sel.last" => return Some(IndexBase::SelLast),
        _ => {}
    }

    if let Some((line, col)) = text.split_once('.') {
        if let Ok(line) = line.parse::<usize>() {
            let col = if col == "end" {
                usize::MAX
            } else {
                col.parse::<usize>().ok()?
            };
            return Some(IndexBase::Pos(TextPos::new(line, col)));
        }
    }

    let is_name = text
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && !text.starts_with(|c: char| c.is_ascii_digit());
    is_name.then(|| IndexBase::Mark(text.to_string()))
}
