//! Operation normaliser
//!
//! Turns the permissive delete/insert/replace requests into canonical
//! [`Change`] records plus the raw edits that realise them. Everything is
//! computed from the buffer state before the mutation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::buffer::TextCore;
use super::change::Change;
use super::cursor::{TextPos, TextRange};
use super::index::Index;
use crate::error::EditError;

/// Text to insert plus the tags it should carry
///
/// Tags are for styling collaborators; the normaliser ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TextChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn tagged(text: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            text: text.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl From<&str> for TextChunk {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Delete,
    Insert,
    Replace,
}

impl FromStr for OperationKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            other => Err(EditError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Replace => "replace",
        })
    }
}

/// A mutation request, before normalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Pairs of indices are ranges; a lone trailing index deletes one character
    Delete { indices: Vec<Index> },
    /// Chunks are inserted in argument order
    Insert { index: Index, chunks: Vec<TextChunk> },
    Replace {
        start: Index,
        end: Index,
        chunks: Vec<TextChunk>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::Insert { .. } => OperationKind::Insert,
            Operation::Replace { .. } => OperationKind::Replace,
        }
    }

    /// Parse the string command form, e.g. `("insert", ["end", "hi", "tag1 tag2"])`
    pub fn from_command(kind: &str, args: &[&str]) -> Result<Self, EditError> {
        let parse = |s: &str| s.parse::<Index>().map_err(EditError::from);

        match kind.parse::<OperationKind>()? {
            OperationKind::Delete => Ok(Operation::Delete {
                indices: args.iter().map(|a| parse(*a)).collect::<Result<_, _>>()?,
            }),
            OperationKind::Insert => {
                let (index, rest) = args
                    .split_first()
                    .ok_or(EditError::WrongArgs("insert index chars ?tagList chars tagList ...?"))?;
                Ok(Operation::Insert {
                    index: parse(*index)?,
                    chunks: chunks_from_args(rest),
                })
            }
            OperationKind::Replace => match args {
                [start, end, rest @ ..] => Ok(Operation::Replace {
                    start: parse(*start)?,
                    end: parse(*end)?,
                    chunks: chunks_from_args(rest),
                }),
                _ => Err(EditError::WrongArgs(
                    "replace index1 index2 chars ?tagList chars tagList ...?",
                )),
            },
        }
    }
}

fn chunks_from_args(args: &[&str]) -> Vec<TextChunk> {
    args.chunks(2)
        .map(|pair| TextChunk {
            text: pair[0].to_string(),
            tags: pair
                .get(1)
                .map(|tags| tags.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
        .collect()
}

fn concat(chunks: &[TextChunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

/// A mutation of the store, with no reporting attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEdit {
    Delete(TextRange),
    Insert(TextPos, String),
    Replace(TextRange, String),
}

/// Result of normalising one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// Changes in document order
    pub changes: Vec<Change>,
    /// Raw edits in the order they must be applied
    pub edits: Vec<RawEdit>,
}

/// `pos` moved one character back when it is the buffer's `end`
pub fn clamp_end<C: TextCore + ?Sized>(core: &C, pos: TextPos) -> TextPos {
    let end = core.end();
    if pos == end {
        core.pos_at(core.offset_of(end).saturating_sub(1))
    } else {
        pos
    }
}

fn resolve_clamped<C: TextCore + ?Sized>(core: &C, index: &Index) -> Result<TextPos, EditError> {
    Ok(clamp_end(core, core.index(index)?))
}

/// Drop empty or inverted pairs, sort by start, merge overlapping or touching ranges
pub fn merge_ranges(pairs: impl IntoIterator<Item = (TextPos, TextPos)>) -> Vec<TextRange> {
    let mut ranges: Vec<TextRange> = pairs
        .into_iter()
        .filter(|(start, end)| start < end)
        .map(|(start, end)| TextRange::new(start, end))
        .collect();
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.reaches(&range) => *last = last.union(&range),
            _ => merged.push(range),
        }
    }
    merged
}

/// Normalise an operation against the current (pre-mutation) buffer
pub fn normalize<C: TextCore + ?Sized>(core: &C, op: &Operation) -> Result<EditPlan, EditError> {
    let plan = match op {
        Operation::Delete { indices } => normalize_delete(core, indices)?,
        Operation::Insert { index, chunks } => {
            let target = resolve_clamped(core, index)?;
            let text = concat(chunks);
            EditPlan {
                changes: vec![Change::new(target, target, 0, text.clone())],
                edits: vec![RawEdit::Insert(target, text)],
            }
        }
        Operation::Replace { start, end, chunks } => {
            let start = resolve_clamped(core, start)?;
            let end = resolve_clamped(core, end)?;
            let range = TextRange::checked(start, end)?;
            let text = concat(chunks);
            EditPlan {
                changes: vec![Change::new(start, end, core.char_count(start, end), text.clone())],
                edits: vec![RawEdit::Replace(range, text)],
            }
        }
    };

    log::trace!("{} normalised into {} change(s)", op.kind(), plan.changes.len());
    Ok(plan)
}

fn normalize_delete<C: TextCore + ?Sized>(core: &C, indices: &[Index]) -> Result<EditPlan, EditError> {
    let mut positions = indices
        .iter()
        .map(|index| resolve_clamped(core, index))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(&last) = positions.last() {
        if positions.len() % 2 == 1 {
            let next = core.pos_at(core.offset_of(last) + 1);
            positions.push(clamp_end(core, next));
        }
    }

    let ranges = merge_ranges(positions.chunks(2).map(|pair| (pair[0], pair[1])));

    // Later ranges are reported in the coordinates left by the earlier ones
    let mut changes: Vec<Change> = Vec::with_capacity(ranges.len());
    for range in &ranges {
        let shift = |pos: TextPos| {
            changes
                .iter()
                .fold(pos, |pos, done: &Change| pos.after_removal(done.range()))
        };
        let change = Change::new(
            shift(range.start),
            shift(range.end),
            core.char_count(range.start, range.end),
            "",
        );
        changes.push(change);
    }

    Ok(EditPlan {
        changes,
        edits: ranges.iter().rev().map(|r| RawEdit::Delete(*r)).collect(),
    })
}
