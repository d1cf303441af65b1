//! Process-wide buffer slot
//!
//! For hosts that keep a single buffer alive in WASM memory and talk to it
//! through free functions instead of a `TextBuffer` object.

use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::api::helpers::{js_error, serialize, string_args};
use crate::text::TextBuffer;
use crate::wasm_log;

// WASM-owned buffer storage
lazy_static! {
    static ref BUFFER: Mutex<Option<TextBuffer>> = Mutex::new(None);
}

fn lock_buffer() -> Result<MutexGuard<'static, Option<TextBuffer>>, JsValue> {
    BUFFER
        .lock()
        .map_err(|e| js_error(format!("Failed to lock buffer: {}", e)))
}

fn with_buffer<R>(f: impl FnOnce(&mut TextBuffer) -> Result<R, JsValue>) -> Result<R, JsValue> {
    let mut guard = lock_buffer()?;
    let buffer = guard
        .as_mut()
        .ok_or_else(|| js_error("No buffer loaded"))?;
    f(buffer)
}

/// Replace the global buffer with a new one holding `text`
#[wasm_bindgen(js_name = loadBuffer)]
pub fn load_buffer(text: &str) -> Result<(), JsValue> {
    let mut guard = lock_buffer()?;
    *guard = Some(TextBuffer::from_text(text));
    wasm_log!("loaded buffer with {} line(s)", text.split('\n').count());
    Ok(())
}

#[wasm_bindgen(js_name = unloadBuffer)]
pub fn unload_buffer() -> Result<bool, JsValue> {
    Ok(lock_buffer()?.take().is_some())
}

#[wasm_bindgen(js_name = getBufferText)]
pub fn get_buffer_text() -> Result<String, JsValue> {
    with_buffer(|buffer| Ok(buffer.text()))
}

/// Run a string command (`insert`, `delete`, `replace`) on the global buffer
#[wasm_bindgen(js_name = bufferCommand)]
pub fn buffer_command(kind: &str, args: js_sys::Array) -> Result<(), JsValue> {
    let args = string_args(&args)?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    with_buffer(|buffer| buffer.run_command(kind, &args).map_err(js_error))
}

/// Drain the change batches queued on the global buffer
#[wasm_bindgen(js_name = takeBufferChanges)]
pub fn take_buffer_changes() -> Result<JsValue, JsValue> {
    with_buffer(|buffer| serialize(&buffer.take_pending(), "Failed to serialize change batches"))
}
