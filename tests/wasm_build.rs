//! WASM build test
//!
//! Checks that the bindings work when compiled for the browser.

#![cfg(target_arch = "wasm32")]

use textbuffer_wasm::api::{get_buffer_text, load_buffer, WasmTextBuffer};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn args(items: &[&str]) -> js_sys::Array {
    items.iter().map(|s| JsValue::from_str(s)).collect()
}

#[wasm_bindgen_test]
fn test_buffer_creation() {
    let buffer = WasmTextBuffer::new("hello\nworld");
    assert_eq!(buffer.text(), "hello\nworld");
    assert_eq!(buffer.lines().length(), 2);
}

#[wasm_bindgen_test]
fn test_replace_and_run_idle() {
    let mut buffer = WasmTextBuffer::new("hello world");
    buffer.replace("1.0", "1.5", "toot").unwrap();
    assert_eq!(buffer.text(), "toot world");

    let events = js_sys::Array::from(&buffer.run_idle().unwrap());
    assert_eq!(events.length(), 1);

    // drained
    let events = js_sys::Array::from(&buffer.run_idle().unwrap());
    assert_eq!(events.length(), 0);
}

#[wasm_bindgen_test]
fn test_command_form() {
    let mut buffer = WasmTextBuffer::new("");
    buffer.command("insert", args(&["end", "abc", "bold"])).unwrap();
    buffer.delete(args(&["1.0"])).unwrap();
    assert_eq!(buffer.text(), "bc");
    assert!(buffer.command("frobnicate", args(&[])).is_err());
}

#[wasm_bindgen_test]
fn test_bad_index_is_an_error() {
    let mut buffer = WasmTextBuffer::new("abc");
    assert!(buffer.insert("nowhere", "x").is_err());
    assert!(buffer.set_cursor("1.2").is_ok());
}

#[wasm_bindgen_test]
fn test_lsp_did_change_requires_open() {
    let mut buffer = WasmTextBuffer::new("abc");
    assert!(buffer.lsp_did_change(JsValue::from(js_sys::Array::new())).is_err());
    buffer.lsp_did_open("file:///a.txt", "plaintext").unwrap();
    assert!(buffer.lsp_did_change(JsValue::from(js_sys::Array::new())).is_ok());
}

#[wasm_bindgen_test]
fn test_global_buffer() {
    load_buffer("xyz").unwrap();
    assert_eq!(get_buffer_text().unwrap(), "xyz");
}
