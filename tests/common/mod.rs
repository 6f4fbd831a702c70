//! Shared test infrastructure for daylist integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use daylist::{Status, Task, TaskStore, partition_for_day};
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: TaskStore,
}

impl TestEnv {
    /// Create a new test environment with an initialized store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = TaskStore::init(temp_dir.path()).expect("Failed to init store");
        Self { temp_dir, store }
    }

    /// Add an every-day task.
    pub fn add_task(&mut self, text: &str) -> Task {
        self.store.add(text, &[]).expect("Failed to add task")
    }

    /// Add a task scoped to specific weekdays.
    pub fn add_task_on(&mut self, text: &str, days: &[u8]) -> Task {
        self.store.add(text, days).expect("Failed to add task")
    }

    /// Toggle a task to completed (the task must currently be undone).
    pub fn complete(&mut self, task: &Task) {
        let status = self.store.toggle(&task.id).expect("Task not found");
        assert_eq!(status, Status::Completed, "Task was not undone before toggle");
    }

    /// The text of every task in list order.
    pub fn texts(&self) -> Vec<String> {
        self.store.tasks().iter().map(|t| t.text.clone()).collect()
    }

    /// Re-fetch a task by id.
    pub fn refetch(&self, task: &Task) -> Task {
        self.store.get(&task.id).expect("Task not found").clone()
    }

    /// Total task count.
    pub fn total_count(&self) -> usize {
        self.store.len()
    }

    /// Count of undone tasks applicable on the given weekday.
    pub fn undone_count_on(&self, weekday: u8) -> usize {
        partition_for_day(&self.store.tasks(), weekday).undone.len()
    }

    /// Count of completed tasks applicable on the given weekday.
    pub fn completed_count_on(&self, weekday: u8) -> usize {
        partition_for_day(&self.store.tasks(), weekday).completed.len()
    }

    /// Assert that a task shows up in the undone bucket for a weekday.
    pub fn assert_undone_on(&self, task: &Task, weekday: u8) {
        let view = partition_for_day(&self.store.tasks(), weekday);
        assert!(
            view.undone.iter().any(|t| t.id == task.id),
            "Expected task {} to be undone on day {}, but it wasn't. Undone: {:?}",
            task.id,
            weekday,
            view.undone.iter().map(|t| &t.id).collect::<Vec<_>>()
        );
    }

    /// Assert that a task is hidden on a weekday (in neither bucket).
    pub fn assert_hidden_on(&self, task: &Task, weekday: u8) {
        let view = partition_for_day(&self.store.tasks(), weekday);
        assert!(
            !view.undone.iter().any(|t| t.id == task.id)
                && !view.completed.iter().any(|t| t.id == task.id),
            "Expected task {} to be hidden on day {}, but it was visible",
            task.id,
            weekday
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
