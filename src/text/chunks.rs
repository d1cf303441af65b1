//! Streaming iteration over buffer content
//!
//! Content is read in chunks of whole lines so indexers never need the
//! entire text at once. Iteration stops at the terminator and never yields
//! an empty chunk.

use std::collections::VecDeque;

use super::buffer::TextCore;
use super::cursor::TextPos;
use super::normalize::clamp_end;

/// Default number of lines per chunk
pub const DEFAULT_CHUNK_LINES: usize = 100;

/// Chunks of `lines_per_chunk` lines; every line but the buffer's last ends with `\n`
pub struct Chunks<'a, C: TextCore + ?Sized> {
    core: &'a C,
    next_line: usize,
    lines_per_chunk: usize,
    done: bool,
}

impl<'a, C: TextCore + ?Sized> Chunks<'a, C> {
    pub fn new(core: &'a C, lines_per_chunk: usize) -> Self {
        Self {
            core,
            next_line: 1,
            lines_per_chunk: lines_per_chunk.max(1),
            done: false,
        }
    }
}

impl<'a, C: TextCore + ?Sized> Iterator for Chunks<'a, C> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = TextPos::line_start(self.next_line);
        let end_line = self.next_line.saturating_add(self.lines_per_chunk);
        let end = self.core.resolve(TextPos::line_start(end_line));

        if end == self.core.end() {
            self.done = true;
            let last = self.core.get(start, clamp_end(self.core, end));
            return (!last.is_empty()).then_some(last);
        }

        self.next_line = end_line;
        Some(self.core.get(start, end))
    }
}

/// Lines with their trailing `\n` kept
pub struct Lines<'a, C: TextCore + ?Sized> {
    chunks: Chunks<'a, C>,
    pending: VecDeque<String>,
}

impl<'a, C: TextCore + ?Sized> Lines<'a, C> {
    pub fn new(core: &'a C, lines_per_chunk: usize) -> Self {
        Self {
            chunks: Chunks::new(core, lines_per_chunk),
            pending: VecDeque::new(),
        }
    }
}

impl<'a, C: TextCore + ?Sized> Iterator for Lines<'a, C> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            let chunk = self.chunks.next()?;
            self.pending
                .extend(chunk.split_inclusive('\n').map(str::to_string));
        }
    }
}
