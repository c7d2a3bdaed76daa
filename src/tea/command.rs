//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side
//! effects (HTTP calls, session persistence) to be executed by the runtime.

use crate::task::{EditBuffer, TaskDraft, TaskId};

/// Output commands from the update function.
/// These represent side effects that need to be executed.
#[derive(Debug)]
pub enum Command {
    // Authentication (spawn async HTTP calls)
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },

    // Task operations (spawn async HTTP calls; bearer token attached)
    FetchTasks,
    CreateTask {
        draft: TaskDraft,
    },
    UpdateTask {
        id: TaskId,
        buffer: EditBuffer,
    },
    DeleteTask {
        id: TaskId,
    },

    // Session persistence
    /// Remove the persisted session file.
    Logout,

    // App lifecycle
    Quit,
}
