//! Text Buffer WASM Module
//!
//! A line/column text buffer with Tk-style index expressions, marks and
//! a selection. Every mutation is normalised into change records that are
//! delivered once per command, after the command has finished.

pub mod text;
pub mod events;
pub mod editing;
pub mod config;
pub mod lsp;
pub mod error;
pub mod api;

// Re-export commonly used types
pub use config::{ConfigError, EditorConfig};
pub use error::{EditError, IndexError};
pub use events::BufferEvent;
pub use lsp::{DocumentSync, LspError};
pub use text::{Change, ChangeBatch, Index, Operation, TextBuffer, TextChunk, TextPos, TextRange};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A logger may already be installed by the host
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Text buffer WASM module initialized");
}
