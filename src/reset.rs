//! Daily reset scheduling.
//!
//! The scheduler checks for a missed reset immediately, then sleeps until
//! the next local midnight and re-checks, looping for the life of the
//! process. The timer is cancelled deterministically on `stop()` or drop so
//! no callback can fire against a torn-down store.

use crate::store::TaskStore;
use chrono::{DateTime, Days, Local};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Slack added past the day boundary so the re-check lands on the new date.
const BOUNDARY_SLACK: Duration = Duration::from_secs(1);

/// Delay from `now` until just past the next local midnight.
pub fn delay_until_next_midnight(now: DateTime<Local>) -> Duration {
    let next_midnight = (now.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| now.naive_local());

    (next_midnight - now.naive_local())
        .to_std()
        .unwrap_or(Duration::ZERO)
        + BOUNDARY_SLACK
}

/// Handle to the background reset timer.
pub struct ResetScheduler {
    handle: JoinHandle<()>,
}

impl ResetScheduler {
    /// Spawn the reset loop against a shared store. The first due-check runs
    /// immediately, covering the catch-up case where the process was closed
    /// over one or more day boundaries.
    pub fn spawn(store: Arc<Mutex<TaskStore>>) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                match store.lock() {
                    Ok(mut store) => {
                        if let Err(e) = store.reset_if_due() {
                            log::warn!("Daily reset check failed: {}", e);
                        }
                    }
                    Err(e) => log::warn!("Store lock poisoned, skipping reset check: {}", e),
                }

                let delay = delay_until_next_midnight(Local::now());
                log::debug!("Next reset check in {}s", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        });

        Self { handle }
    }

    /// Cancel the timer.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for ResetScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_delay_just_before_midnight() {
        let now = Local.with_ymd_and_hms(2026, 8, 30, 23, 59, 0).unwrap();
        let delay = delay_until_next_midnight(now);
        assert_eq!(delay, Duration::from_secs(60) + BOUNDARY_SLACK);
    }

    #[test]
    fn test_delay_at_midnight_spans_full_day() {
        let now = Local.with_ymd_and_hms(2026, 8, 30, 0, 0, 0).unwrap();
        let delay = delay_until_next_midnight(now);
        assert_eq!(delay, Duration::from_secs(24 * 60 * 60) + BOUNDARY_SLACK);
    }

    #[test]
    fn test_delay_is_always_positive() {
        let now = Local.with_ymd_and_hms(2026, 8, 30, 23, 59, 59).unwrap();
        assert!(delay_until_next_midnight(now) > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_scheduler_catches_up_on_spawn() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TaskStore::init(temp_dir.path()).unwrap();
        let id = store.add("Daily", &[]).unwrap().id;
        // Pin the last reset far in the past so the spawn check is due
        store.reset_if_due_on("2000-01-01").unwrap();

        let store = Arc::new(Mutex::new(store));
        let scheduler = ResetScheduler::spawn(Arc::clone(&store));

        // Give the spawned task a moment to run its first check
        tokio::time::sleep(Duration::from_millis(100)).await;

        {
            let store = store.lock().unwrap();
            let task = store.get(&id).unwrap();
            assert_eq!(task.status, crate::types::Status::Undone);
            assert_eq!(task.count, 3); // 1 at creation, +1 pinned, +1 catch-up
        }

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_scheduler_stop_releases_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(Mutex::new(TaskStore::init(temp_dir.path()).unwrap()));

        let scheduler = ResetScheduler::spawn(Arc::clone(&store));
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The aborted task no longer holds the lock
        assert!(store.lock().is_ok());
    }
}
