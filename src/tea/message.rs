//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - keyboard events from the
//! terminal, or completion callbacks from spawned HTTP calls.

use crossterm::event::KeyEvent;

use crate::session::Session;
use crate::task::{Task, TaskId};

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // Authentication callbacks
    /// Login succeeded; the session has already been persisted.
    LoginCompleted(Session),
    LoginFailed(String),
    RegisterCompleted,
    RegisterFailed(String),

    // Task collection callbacks
    /// The fetched collection, replacing local state wholesale.
    TasksFetched(Vec<Task>),
    TasksFetchFailed(String),

    // Mutation callbacks
    TaskCreated,
    TaskCreateFailed(String),
    TaskUpdated(TaskId),
    TaskUpdateFailed(TaskId, String),
    TaskDeleted(TaskId),
    TaskDeleteFailed(TaskId, String),
}
