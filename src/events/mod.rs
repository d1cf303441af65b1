//! Change and cursor notifications
//!
//! Content changes are deferred: a command records its changes in the
//! [`ChangeDispatcher`], which queues at most one batch per command. The host
//! drains the queue in its idle phase, after the command has fully returned.
//! Cursor moves are delivered synchronously at the end of the command.
//!
//! ## Modules
//!
//! - `dispatcher`: per-command change accumulation and the idle queue
//! - `listeners`: observer registration and delivery

pub mod dispatcher;
pub mod listeners;

pub use dispatcher::ChangeDispatcher;
pub use listeners::{ContentListener, CursorListener, ListenerId, Listeners};

use serde::{Deserialize, Serialize};

use crate::text::{ChangeBatch, TextPos};

/// A notification as seen by polling hosts (e.g. the JavaScript side)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BufferEvent {
    ContentChanged { changes: ChangeBatch },
    CursorMoved { position: TextPos },
}
