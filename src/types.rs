//! Core data types for the daylist task list.

use serde::{Deserialize, Serialize};

/// Highest valid weekday index (0 = Sunday .. 6 = Saturday).
pub const MAX_DAY_INDEX: u8 = 6;

/// A single to-do entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier: "dl-" + 10 hex chars from content hash + entropy
    pub id: String,

    /// User-entered label
    pub text: String,

    /// Current state
    pub status: Status,

    /// Weekday indices this task applies to (0 = Sunday .. 6 = Saturday).
    /// Empty means "every day".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<u8>,

    /// Number of days the task has existed; 1 at creation, +1 per daily reset
    pub count: u32,
}

/// Task completion states. Transitions are a binary toggle only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Undone,
    Completed,
}

impl Status {
    /// The other state of the toggle.
    pub fn toggled(&self) -> Status {
        match self {
            Status::Undone => Status::Completed,
            Status::Completed => Status::Undone,
        }
    }
}

/// Reorder direction for `move_task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Validation errors for tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyText,
    TextTooLong,
    InvalidCharacters,
    InvalidDay(u8),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyText => write!(f, "task text cannot be empty"),
            ValidationError::TextTooLong => write!(f, "task text exceeds 500 characters"),
            ValidationError::InvalidCharacters => write!(f, "task text contains control characters"),
            ValidationError::InvalidDay(day) => {
                write!(f, "invalid weekday index {}: must be 0-6", day)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl Task {
    /// Validate the task's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // Text: required, 1-500 chars, no control characters
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.text.len() > 500 {
            return Err(ValidationError::TextTooLong);
        }
        if self.text.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidCharacters);
        }

        // Days: indices within 0-6
        for &day in &self.days {
            if day > MAX_DAY_INDEX {
                return Err(ValidationError::InvalidDay(day));
            }
        }

        Ok(())
    }
}

/// Sort and deduplicate a day set. Empty stays empty ("every day").
pub fn normalize_days(days: &[u8]) -> Vec<u8> {
    let mut days = days.to_vec();
    days.sort_unstable();
    days.dedup();
    days
}

/// Short display name for a weekday index, e.g. `day_name(1) == "Mon"`.
pub fn day_name(day: u8) -> &'static str {
    match day {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "???",
    }
}
