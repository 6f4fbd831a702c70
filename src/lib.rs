//! Daylist: a day-scoped task list with daily reset.
//!
//! Daylist tracks short text tasks that can be scoped to specific weekdays,
//! toggled complete, and reordered. At each day boundary every task flips
//! back to "undone" and its age counter increments. State persists locally
//! in a SQLite-backed key-value snapshot.
//!
//! # Example
//!
//! ```no_run
//! use daylist::{TaskStore, Direction};
//! use daylist::filter::{partition_for_day, today_index};
//! use std::path::Path;
//!
//! // Initialize a new store
//! let mut store = TaskStore::init(Path::new(".")).unwrap();
//!
//! // Add tasks; [1, 3, 5] = Mon/Wed/Fri, empty = every day
//! let water = store.add("Water plants", &[1, 3, 5]).unwrap();
//! store.add("Feed cat", &[]).unwrap();
//!
//! // Complete one and reorder
//! store.toggle(&water.id).unwrap();
//! store.move_task(1, Direction::Up);
//!
//! // Derive what the view shows today
//! let view = partition_for_day(&store.tasks(), today_index());
//! assert_eq!(view.completed.len() + view.undone.len(), 2);
//!
//! // Flip everything back to undone once per calendar day
//! store.reset_if_due().unwrap();
//! ```

mod id;
mod storage;
mod store;
mod types;

pub mod client;
pub mod daemon;
pub mod filter;
pub mod protocol;
pub mod reset;

// Re-export public API
pub use client::Client;
pub use daemon::{Daemon, DaemonConfig, is_daemon_running, start_daemon};
pub use filter::{DayView, applies_on, partition_for_day, today_index};
pub use protocol::{Request, Response};
pub use reset::ResetScheduler;
pub use store::{StoreError, TaskStore};
pub use types::{Direction, Status, Task, ValidationError, day_name, normalize_days};
