//! Text Buffer WASM API
//!
//! JavaScript-facing bindings for the text buffer.
//!
//! # Module Structure
//!
//! - `helpers`: console logging, serialization and error conversion
//! - `buffer`: the `TextBuffer` class
//! - `global`: free functions over a single process-wide buffer

pub mod helpers;
pub mod buffer;
pub mod global;

pub use buffer::WasmTextBuffer;
pub use global::{buffer_command, get_buffer_text, load_buffer, take_buffer_changes, unload_buffer};
