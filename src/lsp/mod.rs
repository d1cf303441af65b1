//! Language-server document sync
//!
//! Builds the `textDocument/didOpen` and `textDocument/didChange`
//! notification parameters from buffer content and change batches.
//! Language servers count lines from 0; buffer lines start at 1.
//! Content changes are applied by the server in listed order, which is
//! how change batches are laid out.

use lsp_types::{
    DidChangeTextDocumentParams, DidOpenTextDocumentParams, Position, Range,
    TextDocumentContentChangeEvent, TextDocumentItem, Uri, VersionedTextDocumentIdentifier,
};
use thiserror::Error;

use crate::text::{Change, ChangeBatch, TextPos};

#[derive(Debug, Error)]
pub enum LspError {
    #[error("invalid document uri \"{0}\": {1}")]
    InvalidUri(String, String),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Buffer position to a 0-based language-server position
pub fn to_lsp_position(pos: TextPos) -> Position {
    Position::new(to_u32(pos.line.saturating_sub(1)), to_u32(pos.col))
}

/// Language-server position back to a buffer position
pub fn from_lsp_position(pos: Position) -> TextPos {
    TextPos::new(pos.line as usize + 1, pos.character as usize)
}

pub fn content_change(change: &Change) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(
            to_lsp_position(change.start),
            to_lsp_position(change.end),
        )),
        range_length: Some(to_u32(change.old_length)),
        text: change.new_text.clone(),
    }
}

/// Tracks the document version sent to a language server
#[derive(Debug, Clone)]
pub struct DocumentSync {
    uri: Uri,
    version: i32,
}

impl DocumentSync {
    pub fn new(uri: &str) -> Result<Self, LspError> {
        let parsed = uri
            .parse::<Uri>()
            .map_err(|e| LspError::InvalidUri(uri.to_string(), e.to_string()))?;
        Ok(Self {
            uri: parsed,
            version: 0,
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Parameters for `textDocument/didOpen` at the current version
    pub fn did_open(&self, language_id: &str, text: &str) -> DidOpenTextDocumentParams {
        DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(
                self.uri.clone(),
                language_id.to_lowercase(),
                self.version,
                text.to_string(),
            ),
        }
    }

    /// Parameters for `textDocument/didChange`; bumps the version once per batch
    pub fn did_change(&mut self, batch: &ChangeBatch) -> DidChangeTextDocumentParams {
        self.version += 1;
        log::debug!(
            "didChange {:?} v{} with {} change(s)",
            self.uri,
            self.version,
            batch.len()
        );
        DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(self.uri.clone(), self.version),
            content_changes: batch.iter().map(content_change).collect(),
        }
    }

    /// `did_change` as a JSON string
    pub fn did_change_json(&mut self, batch: &ChangeBatch) -> Result<String, LspError> {
        Ok(serde_json::to_string(&self.did_change(batch))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(line: usize, col: usize) -> TextPos {
        TextPos::new(line, col)
    }

    #[test]
    fn test_position_conversion() {
        let lsp = to_lsp_position(p(3, 7));
        assert_eq!(lsp, Position::new(2, 7));
        assert_eq!(from_lsp_position(lsp), p(3, 7));
    }

    #[test]
    fn test_did_change_payload() {
        let mut sync = DocumentSync::new("file:///tmp/a.py").unwrap();
        let batch = ChangeBatch::from(vec![Change::new(p(1, 0), p(1, 5), 5, "toot")]);

        let params = serde_json::to_value(sync.did_change(&batch)).unwrap();
        assert_eq!(
            params,
            json!({
                "textDocument": {"uri": "file:///tmp/a.py", "version": 1},
                "contentChanges": [{
                    "range": {
                        "start": {"line": 0, "character": 0},
                        "end": {"line": 0, "character": 5}
                    },
                    "rangeLength": 5,
                    "text": "toot"
                }]
            })
        );
    }

    #[test]
    fn test_version_bumps_per_batch() {
        let mut sync = DocumentSync::new("file:///x").unwrap();
        let batch = ChangeBatch::from(vec![
            Change::new(p(1, 0), p(1, 1), 1, ""),
            Change::new(p(2, 0), p(2, 1), 1, ""),
        ]);
        let first = sync.did_change(&batch);
        assert_eq!(first.content_changes.len(), 2);
        assert_eq!(first.text_document.version, 1);
        sync.did_change(&batch);
        assert_eq!(sync.version(), 2);
    }

    #[test]
    fn test_did_open_lowercases_language() {
        let sync = DocumentSync::new("file:///x").unwrap();
        let value = serde_json::to_value(sync.did_open("Python", "print(1)")).unwrap();
        assert_eq!(value["textDocument"]["languageId"], "python");
        assert_eq!(value["textDocument"]["version"], 0);
    }

    #[test]
    fn test_bad_uri_rejected() {
        assert!(matches!(
            DocumentSync::new("not a uri"),
            Err(LspError::InvalidUri(..))
        ));
    }
}
