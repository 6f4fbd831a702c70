//! IPC protocol types for daemon communication.

use crate::filter::DayView;
use crate::types::{Direction, Task};
use serde::{Deserialize, Serialize};

/// Request sent from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Add a new task.
    Add { text: String, days: Vec<u8> },

    /// Delete a task by ID.
    Delete { id: String },

    /// Replace a task's text.
    Edit { id: String, text: String },

    /// Toggle a task's status undone <-> completed.
    Toggle { id: String },

    /// Swap a task with its neighbor.
    Move { index: usize, direction: Direction },

    /// Get a task by ID.
    Get { id: String },

    /// List all tasks.
    List,

    /// Get the day-filtered view for the current weekday.
    Today,

    /// Run the daily reset check now.
    Reset,

    /// Shutdown the daemon.
    Shutdown,

    /// Ping to check if daemon is alive.
    Ping,
}

/// Response sent from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Single task response.
    Task { task: Task },

    /// Full task list response.
    Tasks { tasks: Vec<Task> },

    /// Day-filtered view response.
    Today { view: DayView },

    /// Task not found.
    NotFound { id: String },

    /// Operation succeeded.
    Ok,

    /// Operation was a bounds-checked no-op (e.g. move with no neighbor).
    Noop,

    /// Whether the reset check fired.
    Reset { fired: bool },

    /// Pong response to ping.
    Pong,

    /// Error response.
    Error { message: String },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
