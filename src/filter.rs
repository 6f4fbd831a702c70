//! Day-scoped filtering of the task list.
//!
//! Pure functions: the view layer calls these against a snapshot to derive
//! what is visible on a given weekday. Tasks not applicable on that day are
//! hidden from both the undone and completed buckets.

use crate::types::Task;
use chrono::{Datelike, Local};

/// True when the task applies on the given weekday (0 = Sunday .. 6 =
/// Saturday). An empty day set means the task applies every day.
pub fn applies_on(task: &Task, weekday: u8) -> bool {
    task.days.is_empty() || task.days.contains(&weekday)
}

/// The visible subsets of the list for one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DayView {
    /// Applicable today, still undone, in list order.
    pub undone: Vec<Task>,

    /// Applicable today, completed, in list order.
    pub completed: Vec<Task>,
}

/// Partition the task list into the undone/completed subsets applicable on
/// the given weekday. List order is preserved within each bucket.
pub fn partition_for_day(tasks: &[Task], weekday: u8) -> DayView {
    let mut view = DayView::default();

    for task in tasks {
        if !applies_on(task, weekday) {
            continue;
        }
        match task.status {
            crate::types::Status::Undone => view.undone.push(task.clone()),
            crate::types::Status::Completed => view.completed.push(task.clone()),
        }
    }

    view
}

/// The current local weekday as 0..=6 with Sunday = 0.
pub fn today_index() -> u8 {
    Local::now().weekday().num_days_from_sunday() as u8
}
