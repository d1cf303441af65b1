//! Change-tracking buffer facade
//!
//! [`TextBuffer`] owns the store and is the only way to mutate it from the
//! outside. Every mutation is normalised first, applied through the raw
//! primitives, and then reported: cursor moves right away, content changes
//! in the next idle phase (see [`TextBuffer::run_idle`]).
//!
//! A *command* is one public call, or everything inside [`TextBuffer::command`].
//! Each command produces at most one cursor notification and at most one
//! change batch, however many primitive edits it performs.

use super::buffer::{Gravity, TextCore, TextStore};
use super::change::ChangeBatch;
use super::chunks::{Chunks, Lines};
use super::cursor::{CursorTracker, CursorUpdate, TextPos, TextRange};
use super::index::{Index, INSERT_MARK};
use super::normalize::{clamp_end, normalize, Operation, RawEdit, TextChunk};
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::events::{ChangeDispatcher, ListenerId, Listeners};

#[derive(Debug)]
pub struct TextBuffer {
    store: TextStore,
    config: EditorConfig,
    cursor: CursorTracker,
    dispatcher: ChangeDispatcher,
    listeners: Listeners,
    depth: usize,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    pub fn with_config(text: &str, config: EditorConfig) -> Self {
        let store = TextStore::from_text(text);
        let cursor = CursorTracker::new(store.cursor());
        Self {
            store,
            config,
            cursor,
            dispatcher: ChangeDispatcher::new(),
            listeners: Listeners::new(),
            depth: 0,
        }
    }

    // ========== Queries ==========

    /// Read access to the underlying store
    pub fn store(&self) -> &TextStore {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Buffer content without the terminator
    pub fn text(&self) -> String {
        self.store.text()
    }

    /// Resolve an index expression (may return `end`)
    pub fn index(&self, index: &Index) -> Result<TextPos, EditError> {
        Ok(self.store.index(index)?)
    }

    /// Text between two index expressions
    pub fn get(&self, start: &Index, end: &Index) -> Result<String, EditError> {
        let start = self.store.index(start)?;
        let end = self.store.index(end)?;
        Ok(self.store.get(start, end))
    }

    /// Current cursor position (never `end`)
    pub fn cursor(&self) -> TextPos {
        clamp_end(&self.store, self.store.cursor())
    }

    pub fn selection(&self) -> Option<TextRange> {
        self.store.selection()
    }

    /// The buffer's end position, moved before the terminator
    pub fn end(&self) -> TextPos {
        clamp_end(&self.store, self.store.end())
    }

    // ========== Mutation entry points ==========

    /// Delete ranges given as index pairs; a lone trailing index deletes one character
    pub fn delete(&mut self, indices: &[Index]) -> Result<(), EditError> {
        self.execute(Operation::Delete {
            indices: indices.to_vec(),
        })
    }

    pub fn insert(&mut self, index: impl Into<Index>, text: &str) -> Result<(), EditError> {
        self.insert_chunks(index, vec![TextChunk::new(text)])
    }

    pub fn insert_chunks(
        &mut self,
        index: impl Into<Index>,
        chunks: Vec<TextChunk>,
    ) -> Result<(), EditError> {
        self.execute(Operation::Insert {
            index: index.into(),
            chunks,
        })
    }

    pub fn replace(
        &mut self,
        start: impl Into<Index>,
        end: impl Into<Index>,
        text: &str,
    ) -> Result<(), EditError> {
        self.replace_chunks(start, end, vec![TextChunk::new(text)])
    }

    pub fn replace_chunks(
        &mut self,
        start: impl Into<Index>,
        end: impl Into<Index>,
        chunks: Vec<TextChunk>,
    ) -> Result<(), EditError> {
        self.execute(Operation::Replace {
            start: start.into(),
            end: end.into(),
            chunks,
        })
    }

    /// Replace an externally supplied range
    pub fn replace_range(&mut self, range: TextRange, text: &str) -> Result<(), EditError> {
        let range = TextRange::checked(range.start, range.end)?;
        self.replace(range.start, range.end, text)
    }

    /// Run the string command form (`"insert"`, `"delete"`, `"replace"`)
    pub fn run_command(&mut self, kind: &str, args: &[&str]) -> Result<(), EditError> {
        let op = Operation::from_command(kind, args).map_err(|e| {
            log::warn!("rejected command {:?}: {}", kind, e);
            e
        })?;
        self.execute(op)
    }

    /// Normalise and apply one operation as a command
    pub fn execute(&mut self, op: Operation) -> Result<(), EditError> {
        self.command(|buffer| buffer.apply(&op))
    }

    fn apply(&mut self, op: &Operation) -> Result<(), EditError> {
        let plan = normalize(&self.store, op)?;
        for edit in &plan.edits {
            match edit {
                RawEdit::Delete(range) => self.store.raw_delete(range.start, range.end),
                RawEdit::Insert(pos, text) => self.store.raw_insert(*pos, text),
                RawEdit::Replace(range, text) => self.store.raw_replace(range.start, range.end, text),
            }
        }
        self.dispatcher.record(plan.changes);
        Ok(())
    }

    // ========== Marks and selection ==========

    /// Move the cursor
    pub fn set_cursor(&mut self, index: impl Into<Index>) -> Result<(), EditError> {
        self.mark_set(INSERT_MARK, index)
    }

    pub fn mark_set(&mut self, name: &str, index: impl Into<Index>) -> Result<(), EditError> {
        let index = index.into();
        self.command(|buffer| {
            let pos = buffer.store.index(&index)?;
            buffer.store.mark_set(name, pos);
            Ok(())
        })
    }

    pub fn mark_unset(&mut self, name: &str) -> bool {
        self.store.mark_unset(name)
    }

    pub fn mark(&self, name: &str) -> Option<TextPos> {
        self.store.mark(name)
    }

    pub fn set_mark_gravity(&mut self, name: &str, gravity: Gravity) -> bool {
        self.store.set_mark_gravity(name, gravity)
    }

    pub fn set_selection(&mut self, start: impl Into<Index>, end: impl Into<Index>) -> Result<(), EditError> {
        let start = self.store.index(&start.into())?;
        let end = self.store.index(&end.into())?;
        self.store.set_selection(start, end);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    // ========== Commands and notifications ==========

    /// Run `f` as one command
    ///
    /// Nested calls join the outermost command; reporting happens when it ends.
    pub fn command<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            self.finish_command();
        }
        result
    }

    fn finish_command(&mut self) {
        let pos = self.cursor();
        if let CursorUpdate::JustMoved(pos) = self.cursor.observe(pos) {
            log::trace!("cursor moved to {}", pos);
            self.listeners.emit_cursor(pos);
        }
        self.dispatcher.finish_command();
    }

    pub fn on_content_changed(
        &mut self,
        listener: impl FnMut(&TextStore, &ChangeBatch) + Send + 'static,
    ) -> ListenerId {
        self.listeners.add_content(Box::new(listener))
    }

    pub fn on_cursor_moved(&mut self, listener: impl FnMut(TextPos) + Send + 'static) -> ListenerId {
        self.listeners.add_cursor(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Idle phase: deliver queued change batches. Returns how many were delivered.
    pub fn run_idle(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(batch) = self.dispatcher.pop_pending() {
            self.listeners.emit_content(&self.store, &batch);
            delivered += 1;
        }
        delivered
    }

    /// Drain queued batches without calling listeners (for polling hosts)
    pub fn take_pending(&mut self) -> Vec<ChangeBatch> {
        std::iter::from_fn(|| self.dispatcher.pop_pending()).collect()
    }

    pub fn has_pending(&self) -> bool {
        self.dispatcher.has_pending()
    }

    // ========== Streaming ==========

    pub fn iter_chunks(&self, lines_per_chunk: usize) -> Chunks<'_, TextStore> {
        Chunks::new(&self.store, lines_per_chunk)
    }

    /// Lines with their `\n`, read in chunks of the configured size
    pub fn iter_lines(&self) -> Lines<'_, TextStore> {
        Lines::new(&self.store, self.config.chunk_lines)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
