//! Observer registration

use crate::text::{ChangeBatch, TextPos, TextStore};

/// Called in the idle phase with the fully updated buffer and the batch
pub type ContentListener = Box<dyn FnMut(&TextStore, &ChangeBatch) + Send>;

/// Called synchronously when the cursor lands somewhere new
pub type CursorListener = Box<dyn FnMut(TextPos) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    content: Vec<(ListenerId, ContentListener)>,
    cursor: Vec<(ListenerId, CursorListener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    pub fn add_content(&mut self, listener: ContentListener) -> ListenerId {
        let id = self.allocate();
        self.content.push((id, listener));
        id
    }

    pub fn add_cursor(&mut self, listener: CursorListener) -> ListenerId {
        let id = self.allocate();
        self.cursor.push((id, listener));
        id
    }

    /// Remove a listener of either kind
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.content.len() + self.cursor.len();
        self.content.retain(|(other, _)| *other != id);
        self.cursor.retain(|(other, _)| *other != id);
        before != self.content.len() + self.cursor.len()
    }

    pub fn emit_content(&mut self, store: &TextStore, batch: &ChangeBatch) {
        for (_, listener) in &mut self.content {
            listener(store, batch);
        }
    }

    pub fn emit_cursor(&mut self, pos: TextPos) {
        for (_, listener) in &mut self.cursor {
            listener(pos);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("content", &self.content.len())
            .field("cursor", &self.cursor.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_remove_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();

        let sink = Arc::clone(&seen);
        let id = listeners.add_cursor(Box::new(move |pos| sink.lock().unwrap().push(pos)));

        listeners.emit_cursor(TextPos::new(1, 1));
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.emit_cursor(TextPos::new(1, 2));

        assert_eq!(*seen.lock().unwrap(), vec![TextPos::new(1, 1)]);
    }
}
