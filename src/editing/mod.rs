//! Editing commands
//!
//! Keyboard-level operations built on top of [`TextBuffer`]. Each public
//! method runs as a single command, so it produces at most one cursor
//! notification and one change batch.

use crate::error::EditError;
use crate::text::{Index, TextBuffer, TextCore, TextPos};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl TextBuffer {
    /// Insert one indentation step at `index`
    ///
    /// With `tabs_to_spaces` the inserted spaces line the column up on the
    /// next multiple of `indent_size`.
    pub fn indent(&mut self, index: impl Into<Index>) -> Result<(), EditError> {
        let index = index.into();
        self.command(|buffer| {
            let pos = buffer.index(&index)?;
            let text = if buffer.config().tabs_to_spaces {
                let size = buffer.config().indent_size.max(1);
                " ".repeat(size - pos.col % size)
            } else {
                "\t".to_string()
            };
            buffer.insert(pos, &text)
        })
    }

    /// Remove one indentation step left of `index`. Returns whether anything was removed.
    ///
    /// At column 0 the step to the right is removed instead, which dedents a
    /// whole line. Non-whitespace is never removed.
    pub fn dedent(&mut self, index: impl Into<Index>) -> Result<bool, EditError> {
        let index = index.into();
        self.command(|buffer| buffer.dedent_at(&index))
    }

    fn dedent_at(&mut self, index: &Index) -> Result<bool, EditError> {
        let pos = self.index(index)?;

        if !self.config().tabs_to_spaces {
            let before = self.index(&index.clone().chars(-1))?;
            if self.store().get(before, pos) == "\t" {
                self.delete(&[Index::from(before), Index::from(pos)])?;
                return Ok(true);
            }
            return Ok(false);
        }

        let size = self.config().indent_size.max(1);
        let line: Vec<char> = self.store().line(pos.line).unwrap_or("").chars().collect();

        let (mut start, mut end) = if pos.col == 0 {
            (0, size)
        } else {
            let mut start = pos.col - pos.col % size;
            if start == pos.col {
                start -= size;
            }
            (start, start + size)
        };
        end = end.min(line.len());
        if start == 0 {
            let leading = line.iter().take_while(|c| c.is_whitespace()).count();
            end = end.min(leading);
        }
        start = start.min(end);

        if start == end || !line[start..end].iter().all(|c| c.is_whitespace()) {
            return Ok(false);
        }
        self.delete(&[
            Index::from(TextPos::new(pos.line, start)),
            Index::from(TextPos::new(pos.line, end)),
        ])?;
        Ok(true)
    }

    /// Backspace key
    ///
    /// Deletes the selection if there is one. Otherwise dedents when only
    /// whitespace precedes the cursor on its line, and deletes the previous
    /// character when that is not possible.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        self.command(|buffer| {
            if buffer.delete_selection()? {
                return Ok(());
            }
            let cursor = buffer.cursor();
            let before = buffer.store().get(TextPos::line_start(cursor.line), cursor);
            if !before.is_empty() && before.chars().all(char::is_whitespace) && buffer.dedent_at(&Index::insert())? {
                return Ok(());
            }
            buffer.delete(&[Index::insert().chars(-1), Index::insert()])
        })
    }

    /// Type a closing bracket at the cursor
    ///
    /// `)`, `]` and `}` first dedent the cursor's line one step, so a closing
    /// bracket typed on an indented blank line lines up with its block.
    /// Any other character is inserted unchanged.
    pub fn closing_brace(&mut self, ch: char) -> Result<(), EditError> {
        self.command(|buffer| {
            if matches!(ch, ')' | ']' | '}') {
                buffer.dedent_at(&Index::insert())?;
            }
            buffer.insert(Index::insert(), &ch.to_string())
        })
    }

    /// Delete to the end (`forward`) or start of the cursor's line
    ///
    /// When nothing is left on that side, the adjacent newline goes instead.
    pub fn delete_to_line_boundary(&mut self, forward: bool) -> Result<(), EditError> {
        self.command(|buffer| {
            if buffer.delete_selection()? {
                return Ok(());
            }
            let (plan_a, plan_b) = if forward {
                (
                    [Index::insert(), Index::insert().lineend()],
                    [Index::insert(), Index::insert().chars(1)],
                )
            } else {
                (
                    [Index::insert().linestart(), Index::insert()],
                    [Index::insert().chars(-1), Index::insert()],
                )
            };
            if buffer.index(&plan_a[0])? == buffer.index(&plan_a[1])? {
                buffer.delete(&plan_b)
            } else {
                buffer.delete(&plan_a)
            }
        })
    }

    /// Delete to the end of the next word (`forward`) or the start of the previous one
    pub fn delete_word(&mut self, forward: bool) -> Result<(), EditError> {
        self.command(|buffer| {
            if buffer.delete_selection()? {
                return Ok(());
            }
            let cursor = buffer.cursor();
            let target = if forward {
                buffer.next_word_end(cursor)
            } else {
                buffer.prev_word_start(cursor)
            };
            let (start, end) = if forward { (cursor, target) } else { (target, cursor) };
            buffer.delete(&[Index::from(start), Index::from(end)])
        })
    }

    /// Select everything except the terminator
    pub fn select_all(&mut self) -> Result<(), EditError> {
        self.set_selection(TextPos::start(), Index::end().chars(-1))
    }

    /// Insert `text` at the cursor, replacing the selection when there is one
    ///
    /// The cursor ends up after the pasted text.
    pub fn paste(&mut self, text: &str) -> Result<(), EditError> {
        self.command(|buffer| {
            let at = match buffer.selection() {
                Some(range) => {
                    buffer.replace(range.start, range.end, text)?;
                    range.start
                }
                None => {
                    let cursor = buffer.cursor();
                    buffer.insert(cursor, text)?;
                    cursor
                }
            };
            let store = buffer.store();
            let after = store.pos_at(store.offset_of(at) + text.chars().count());
            buffer.set_cursor(after)
        })
    }

    /// Delete the selected text. Returns `false` when nothing is selected.
    fn delete_selection(&mut self) -> Result<bool, EditError> {
        match self.selection() {
            Some(range) => {
                self.delete(&[Index::from(range.start), Index::from(range.end)])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn char_before(&self, offset: usize) -> Option<char> {
        let store = self.store();
        offset
            .checked_sub(1)
            .and_then(|prev| store.char_at(store.pos_at(prev)))
    }

    fn next_word_end(&self, from: TextPos) -> TextPos {
        let store = self.store();
        let last = store.offset_of(self.end());
        let mut offset = store.offset_of(from);

        while offset < last && store.char_at(store.pos_at(offset)).is_some_and(|c| !is_word_char(c)) {
            offset += 1;
        }
        while offset < last && store.char_at(store.pos_at(offset)).is_some_and(is_word_char) {
            offset += 1;
        }
        store.pos_at(offset)
    }

    fn prev_word_start(&self, from: TextPos) -> TextPos {
        let store = self.store();
        let mut offset = store.offset_of(from);

        while self.char_before(offset).is_some_and(|c| !is_word_char(c)) {
            offset -= 1;
        }
        while self.char_before(offset).is_some_and(is_word_char) {
            offset -= 1;
        }
        store.pos_at(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn p(line: usize, col: usize) -> TextPos {
        TextPos::new(line, col)
    }

    fn buffer_with(text: &str, tabs_to_spaces: bool) -> TextBuffer {
        let config = EditorConfig {
            tabs_to_spaces,
            ..EditorConfig::default()
        };
        TextBuffer::with_config(text, config)
    }

    #[test]
    fn test_indent_lines_up_on_indent_size() {
        let mut buffer = TextBuffer::from_text("abcdefg");
        buffer.indent(p(1, 7)).unwrap();
        assert_eq!(buffer.text(), "abcdefg ");

        buffer.indent(p(1, 0)).unwrap();
        assert_eq!(buffer.text(), "    abcdefg ");
    }

    #[test]
    fn test_indent_with_tabs() {
        let mut buffer = buffer_with("x", false);
        buffer.indent(p(1, 0)).unwrap();
        assert_eq!(buffer.text(), "\tx");
    }

    #[test]
    fn test_dedent_prefers_left_side() {
        let mut buffer = TextBuffer::from_text("        x");
        assert!(buffer.dedent(p(1, 8)).unwrap());
        assert_eq!(buffer.text(), "    x");
    }

    #[test]
    fn test_dedent_undersized_indent() {
        let mut buffer = TextBuffer::from_text("  x");
        assert!(buffer.dedent(p(1, 0)).unwrap());
        assert_eq!(buffer.text(), "x");
    }

    #[test]
    fn test_dedent_never_removes_text() {
        let mut buffer = TextBuffer::from_text("ab x");
        assert!(!buffer.dedent(p(1, 4)).unwrap());
        assert_eq!(buffer.text(), "ab x");
        assert!(!buffer.has_pending());
    }

    #[test]
    fn test_dedent_tab() {
        let mut buffer = buffer_with("\t\tx", false);
        assert!(buffer.dedent(p(1, 2)).unwrap());
        assert_eq!(buffer.text(), "\tx");
        assert!(!buffer.dedent(p(1, 2)).unwrap());
    }

    #[test]
    fn test_backspace_dedents_leading_whitespace() {
        let mut buffer = TextBuffer::from_text("        x");
        buffer.set_cursor(p(1, 8)).unwrap();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), "    x");
        assert_eq!(buffer.cursor(), p(1, 4));
    }

    #[test]
    fn test_backspace_deletes_previous_char() {
        let mut buffer = TextBuffer::from_text("abc");
        buffer.set_cursor(p(1, 2)).unwrap();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), "ac");
        assert_eq!(buffer.cursor(), p(1, 1));

        buffer.set_cursor(p(1, 0)).unwrap();
        buffer.take_pending();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), "ac");
        assert!(!buffer.has_pending());
    }

    #[test]
    fn test_backspace_in_space_indent_with_tabs_config() {
        let mut buffer = buffer_with("  x", false);
        buffer.set_cursor(p(1, 2)).unwrap();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), " x");
        assert_eq!(buffer.cursor(), p(1, 1));
    }

    #[test]
    fn test_closing_brace_dedents_blank_line() {
        let mut buffer = TextBuffer::from_text("if x {\n        ");
        buffer.set_cursor(p(2, 8)).unwrap();
        buffer.take_pending();
        buffer.closing_brace('}').unwrap();
        assert_eq!(buffer.text(), "if x {\n    }");
        assert_eq!(buffer.cursor(), p(2, 5));
        assert_eq!(buffer.take_pending().len(), 1);
    }

    #[test]
    fn test_closing_brace_keeps_code() {
        let mut buffer = TextBuffer::from_text("foo(a");
        buffer.set_cursor(p(1, 5)).unwrap();
        buffer.closing_brace(')').unwrap();
        assert_eq!(buffer.text(), "foo(a)");

        buffer.closing_brace('x').unwrap();
        assert_eq!(buffer.text(), "foo(a)x");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = TextBuffer::from_text("ab\ncd");
        buffer.set_cursor(p(2, 0)).unwrap();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), "abcd");
    }

    #[test]
    fn test_backspace_removes_selection() {
        let mut buffer = TextBuffer::from_text("hello world");
        buffer.set_selection(p(1, 5), p(1, 11)).unwrap();
        buffer.backspace().unwrap();
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.selection(), None);
    }

    #[test]
    fn test_delete_to_line_end_then_newline() {
        let mut buffer = TextBuffer::from_text("abc\ndef");
        buffer.set_cursor(p(1, 1)).unwrap();
        buffer.delete_to_line_boundary(true).unwrap();
        assert_eq!(buffer.text(), "a\ndef");

        buffer.delete_to_line_boundary(true).unwrap();
        assert_eq!(buffer.text(), "adef");
    }

    #[test]
    fn test_delete_to_line_start_then_newline() {
        let mut buffer = TextBuffer::from_text("abc\ndef");
        buffer.set_cursor(p(2, 2)).unwrap();
        buffer.delete_to_line_boundary(false).unwrap();
        assert_eq!(buffer.text(), "abc\nf");
        assert_eq!(buffer.cursor(), p(2, 0));

        buffer.delete_to_line_boundary(false).unwrap();
        assert_eq!(buffer.text(), "abcf");
    }

    #[test]
    fn test_delete_word_both_ways() {
        let mut buffer = TextBuffer::from_text("foo bar_baz qux");
        buffer.set_cursor(p(1, 3)).unwrap();
        buffer.delete_word(true).unwrap();
        assert_eq!(buffer.text(), "foo qux");

        buffer.set_cursor(p(1, 7)).unwrap();
        buffer.delete_word(false).unwrap();
        assert_eq!(buffer.text(), "foo ");
    }

    #[test]
    fn test_delete_word_is_one_batch() {
        let mut buffer = TextBuffer::from_text("one two");
        buffer.set_cursor(p(1, 7)).unwrap();
        buffer.take_pending();
        buffer.delete_word(false).unwrap();
        let batches = buffer.take_pending();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].changes()[0].old_length, 3);
    }

    #[test]
    fn test_select_all_excludes_terminator() {
        let mut buffer = TextBuffer::from_text("ab\ncd");
        buffer.select_all().unwrap();
        let selection = buffer.selection().unwrap();
        assert_eq!(selection.start, p(1, 0));
        assert_eq!(selection.end, p(2, 2));
    }

    #[test]
    fn test_select_all_on_empty_buffer() {
        let mut buffer = TextBuffer::new();
        buffer.select_all().unwrap();
        assert_eq!(buffer.selection(), None);
    }

    #[test]
    fn test_paste_replaces_selection() {
        let mut buffer = TextBuffer::from_text("hello world");
        buffer.set_selection(p(1, 0), p(1, 5)).unwrap();
        buffer.paste("bye").unwrap();
        assert_eq!(buffer.text(), "bye world");
        assert_eq!(buffer.cursor(), p(1, 3));
        assert_eq!(buffer.selection(), None);
    }

    #[test]
    fn test_paste_at_cursor() {
        let mut buffer = TextBuffer::from_text("ad");
        buffer.set_cursor(p(1, 1)).unwrap();
        buffer.paste("b\nc").unwrap();
        assert_eq!(buffer.text(), "ab\ncd");
        assert_eq!(buffer.cursor(), p(2, 1));
    }
}
