//! JavaScript-facing text buffer
//!
//! Wraps [`TextBuffer`] for the browser. Cursor moves are collected as they
//! happen; `runIdle` hands them to JavaScript together with the change
//! batches queued since the last call.

use std::sync::{Arc, Mutex};

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, js_error, parse_index, serialize, string_args};
use crate::config::EditorConfig;
use crate::events::BufferEvent;
use crate::lsp::DocumentSync;
use crate::text::{ChangeBatch, Index, TextBuffer, TextPos};
use crate::{wasm_log, wasm_warn};

#[wasm_bindgen(js_name = TextBuffer)]
pub struct WasmTextBuffer {
    inner: TextBuffer,
    cursor_moves: Arc<Mutex<Vec<TextPos>>>,
    sync: Option<DocumentSync>,
}

impl WasmTextBuffer {
    fn wrap(mut inner: TextBuffer) -> Self {
        let cursor_moves = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&cursor_moves);
        inner.on_cursor_moved(move |pos| {
            if let Ok(mut moves) = sink.lock() {
                moves.push(pos);
            }
        });
        Self {
            inner,
            cursor_moves,
            sync: None,
        }
    }

    fn take_cursor_moves(&self) -> Vec<TextPos> {
        self.cursor_moves
            .lock()
            .map(|mut moves| std::mem::take(&mut *moves))
            .unwrap_or_default()
    }
}

#[wasm_bindgen(js_class = TextBuffer)]
impl WasmTextBuffer {
    #[wasm_bindgen(constructor)]
    pub fn new(text: &str) -> WasmTextBuffer {
        Self::wrap(TextBuffer::from_text(text))
    }

    /// Create a buffer with an `EditorConfig` object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(text: &str, config: JsValue) -> Result<WasmTextBuffer, JsValue> {
        let config: EditorConfig = deserialize(config, "Invalid editor config")?;
        Ok(Self::wrap(TextBuffer::with_config(text, config)))
    }

    /// Create a buffer with a YAML config document
    #[wasm_bindgen(js_name = withYamlConfig)]
    pub fn with_yaml_config(text: &str, yaml: &str) -> Result<WasmTextBuffer, JsValue> {
        let config = EditorConfig::from_yaml_str(yaml).map_err(js_error)?;
        Ok(Self::wrap(TextBuffer::with_config(text, config)))
    }

    pub fn text(&self) -> String {
        self.inner.text()
    }

    /// Lines without their newlines
    pub fn lines(&self) -> js_sys::Array {
        self.inner
            .store()
            .lines()
            .iter()
            .map(|line| JsValue::from_str(line))
            .collect()
    }

    /// Resolve an index expression to `{line, col}`
    pub fn index(&self, expr: &str) -> Result<JsValue, JsValue> {
        let pos = self.inner.index(&parse_index(expr)?).map_err(js_error)?;
        serialize(&pos, "Failed to serialize position")
    }

    pub fn get(&self, start: &str, end: &str) -> Result<String, JsValue> {
        self.inner
            .get(&parse_index(start)?, &parse_index(end)?)
            .map_err(js_error)
    }

    pub fn insert(&mut self, index: &str, text: &str) -> Result<(), JsValue> {
        self.inner.insert(parse_index(index)?, text).map_err(js_error)
    }

    /// Delete index pairs; an odd trailing index deletes one character
    pub fn delete(&mut self, indices: js_sys::Array) -> Result<(), JsValue> {
        let indices = string_args(&indices)?
            .iter()
            .map(|s| parse_index(s))
            .collect::<Result<Vec<Index>, _>>()?;
        self.inner.delete(&indices).map_err(js_error)
    }

    pub fn replace(&mut self, start: &str, end: &str, text: &str) -> Result<(), JsValue> {
        self.inner
            .replace(parse_index(start)?, parse_index(end)?, text)
            .map_err(js_error)
    }

    /// String command form: `command("insert", ["end", "text", "tag"])`
    pub fn command(&mut self, kind: &str, args: js_sys::Array) -> Result<(), JsValue> {
        let args = string_args(&args)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.inner.run_command(kind, &args).map_err(|e| {
            wasm_warn!("command {} failed: {}", kind, e);
            js_error(e)
        })
    }

    #[wasm_bindgen(js_name = setCursor)]
    pub fn set_cursor(&mut self, index: &str) -> Result<(), JsValue> {
        self.inner.set_cursor(parse_index(index)?).map_err(js_error)
    }

    pub fn cursor(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.cursor(), "Failed to serialize cursor")
    }

    pub fn selection(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.selection(), "Failed to serialize selection")
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, start: &str, end: &str) -> Result<(), JsValue> {
        self.inner
            .set_selection(parse_index(start)?, parse_index(end)?)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) -> Result<(), JsValue> {
        self.inner.select_all().map_err(js_error)
    }

    pub fn indent(&mut self, index: &str) -> Result<(), JsValue> {
        self.inner.indent(parse_index(index)?).map_err(js_error)
    }

    pub fn dedent(&mut self, index: &str) -> Result<bool, JsValue> {
        self.inner.dedent(parse_index(index)?).map_err(js_error)
    }

    pub fn backspace(&mut self) -> Result<(), JsValue> {
        self.inner.backspace().map_err(js_error)
    }

    /// Type `)`, `]` or `}` with auto-dedent
    #[wasm_bindgen(js_name = closingBrace)]
    pub fn closing_brace(&mut self, ch: char) -> Result<(), JsValue> {
        self.inner.closing_brace(ch).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteWord)]
    pub fn delete_word(&mut self, forward: bool) -> Result<(), JsValue> {
        self.inner.delete_word(forward).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteToLineBoundary)]
    pub fn delete_to_line_boundary(&mut self, forward: bool) -> Result<(), JsValue> {
        self.inner.delete_to_line_boundary(forward).map_err(js_error)
    }

    pub fn paste(&mut self, text: &str) -> Result<(), JsValue> {
        self.inner.paste(text).map_err(js_error)
    }

    /// Idle phase: returns the cursor moves and content changes since the last call
    #[wasm_bindgen(js_name = runIdle)]
    pub fn run_idle(&mut self) -> Result<JsValue, JsValue> {
        let mut events: Vec<BufferEvent> = self
            .take_cursor_moves()
            .into_iter()
            .map(|position| BufferEvent::CursorMoved { position })
            .collect();
        events.extend(
            self.inner
                .take_pending()
                .into_iter()
                .map(|changes| BufferEvent::ContentChanged { changes }),
        );
        if !events.is_empty() {
            wasm_log!("runIdle delivering {} event(s)", events.len());
        }
        serialize(&events, "Failed to serialize buffer events")
    }

    /// Start language-server sync; returns the `didOpen` parameters
    #[wasm_bindgen(js_name = lspDidOpen)]
    pub fn lsp_did_open(&mut self, uri: &str, language_id: &str) -> Result<JsValue, JsValue> {
        let sync = DocumentSync::new(uri).map_err(js_error)?;
        let params = sync.did_open(language_id, &self.inner.text());
        self.sync = Some(sync);
        serialize(&params, "Failed to serialize didOpen params")
    }

    /// `didChange` parameters for a batch taken from a `contentChanged` event
    #[wasm_bindgen(js_name = lspDidChange)]
    pub fn lsp_did_change(&mut self, changes: JsValue) -> Result<JsValue, JsValue> {
        let batch: ChangeBatch = deserialize(changes, "Invalid change batch")?;
        let sync = self
            .sync
            .as_mut()
            .ok_or_else(|| js_error("lspDidOpen must be called before lspDidChange"))?;
        serialize(&sync.did_change(&batch), "Failed to serialize didChange params")
    }
}
