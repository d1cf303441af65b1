//! Text core
//!
//! Pure text editing with change tracking. Positions are line/column pairs
//! (1-based lines, 0-based character columns); the buffer always ends with
//! an implicit newline that user edits never touch.
//!
//! ## Modules
//!
//! - `cursor`: positions, ranges and the cursor tracker
//! - `index`: index expressions (`3.4`, `end`, `insert + 2 chars`, ...)
//! - `buffer`: line storage, marks, selection and the raw edit primitives
//! - `change`: change records and batches
//! - `normalize`: canonicalises delete/insert/replace requests
//! - `chunks`: streaming the content in line chunks
//! - `tracked`: the public buffer that reports what changed

pub mod buffer;
pub mod change;
pub mod chunks;
pub mod cursor;
pub mod index;
pub mod normalize;
pub mod tracked;

// Re-exports for convenience
pub use buffer::{Gravity, Mark, TextCore, TextStore};
pub use change::{Change, ChangeBatch};
pub use chunks::{Chunks, Lines, DEFAULT_CHUNK_LINES};
pub use cursor::{CursorTracker, CursorUpdate, TextPos, TextRange};
pub use index::{Index, IndexBase, Modifier, INSERT_MARK};
pub use normalize::{
    clamp_end, merge_ranges, normalize, EditPlan, Operation, OperationKind, RawEdit, TextChunk,
};
pub use tracked::TextBuffer;
