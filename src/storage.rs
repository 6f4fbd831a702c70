//! Storage layer for daylist: a SQLite-backed key-value snapshot.
//!
//! Persistence mirrors a browser local-storage model: one key holds the
//! JSON-serialized task list, rewritten in full on every mutation, and a
//! second key holds the date string of the last daily reset. The reset date
//! is compared for equality only, never parsed.

use crate::types::Task;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

/// Storage directory name.
const DAYLIST_DIR: &str = ".daylist";

/// SQLite database file.
const DB_FILE: &str = "daylist.db";

/// Key holding the serialized task list.
const TASKS_KEY: &str = "tasks";

/// Key holding the last-reset date string.
const LAST_RESET_KEY: &str = "last_reset";

/// SQLite schema: a single key-value table.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

/// Storage handle for reading/writing daylist data.
pub struct Storage {
    db: Connection,
}

impl Storage {
    /// Initialize storage in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        let daylist_dir = root.join(DAYLIST_DIR);
        fs::create_dir_all(&daylist_dir).context("Failed to create .daylist directory")?;

        let db = Self::open_database(&daylist_dir.join(DB_FILE))?;
        Ok(Self { db })
    }

    /// Open existing storage.
    pub fn open(root: &Path) -> Result<Self> {
        let daylist_dir = root.join(DAYLIST_DIR);
        if !daylist_dir.exists() {
            eyre::bail!("No .daylist directory found. Run 'dl init' first.");
        }

        let db = Self::open_database(&daylist_dir.join(DB_FILE))?;
        Ok(Self { db })
    }

    /// Open the database file, degrading to an in-memory database when the
    /// file cannot be opened or is not a valid database. The fallback keeps
    /// the process alive with the in-memory default; its contents do not
    /// outlive the process.
    fn open_database(db_path: &Path) -> Result<Connection> {
        match Connection::open(db_path).and_then(|db| db.execute_batch(SCHEMA).map(|_| db)) {
            Ok(db) => Ok(db),
            Err(e) => {
                log::warn!(
                    "Failed to open task database {}, using in-memory state: {}",
                    db_path.display(),
                    e
                );
                let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
                db.execute_batch(SCHEMA).context("Failed to initialize schema")?;
                Ok(db)
            }
        }
    }

    /// Read a meta value by key.
    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM meta WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()
            .context("Failed to read meta value")?;
        Ok(value)
    }

    /// Write a meta value, replacing any existing one.
    fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?, ?)",
                params![key, value],
            )
            .context("Failed to write meta value")?;
        Ok(())
    }

    /// Load the persisted task list.
    ///
    /// A missing, unreadable, or malformed snapshot degrades to the empty
    /// list with a warning instead of failing the caller.
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        let json = match self.get_meta(TASKS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                log::warn!("Failed to read persisted task list, starting empty: {}", e);
                return Ok(Vec::new());
            }
        };

        match serde_json::from_str::<Vec<Task>>(&json) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                log::warn!("Failed to parse persisted task list, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Persist the full task list as a single snapshot.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks).context("Failed to serialize task list")?;
        self.set_meta(TASKS_KEY, &json)
    }

    /// The date string recorded by the last daily reset, if any.
    pub fn last_reset(&self) -> Result<Option<String>> {
        self.get_meta(LAST_RESET_KEY)
    }

    /// Record the date string of a completed daily reset.
    pub fn set_last_reset(&self, date: &str) -> Result<()> {
        self.set_meta(LAST_RESET_KEY, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use tempfile::TempDir;

    fn setup_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::init(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    fn make_task(id: &str, text: &str) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            status: Status::Undone,
            days: vec![],
            count: 1,
        }
    }

    #[test]
    fn test_init_creates_db() {
        let temp_dir = TempDir::new().unwrap();
        let _storage = Storage::init(temp_dir.path()).unwrap();

        assert!(temp_dir.path().join(DAYLIST_DIR).exists());
        assert!(temp_dir.path().join(DAYLIST_DIR).join(DB_FILE).exists());
    }

    #[test]
    fn test_open_without_init_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Storage::open(temp_dir.path()).is_err());
    }

    #[test]
    fn test_load_tasks_empty_by_default() {
        let (_temp_dir, storage) = setup_test_storage();
        assert!(storage.load_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_tasks() {
        let (_temp_dir, storage) = setup_test_storage();

        let tasks = vec![
            make_task("dl-0000000001", "Water plants"),
            make_task("dl-0000000002", "Feed cat"),
        ];
        storage.save_tasks(&tasks).unwrap();

        let loaded = storage.load_tasks().unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn test_save_overwrites_snapshot() {
        let (_temp_dir, storage) = setup_test_storage();

        storage.save_tasks(&[make_task("dl-0000000001", "First")]).unwrap();
        storage.save_tasks(&[make_task("dl-0000000002", "Second")]).unwrap();

        let loaded = storage.load_tasks().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "Second");
    }

    #[test]
    fn test_tasks_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Storage::init(temp_dir.path()).unwrap();
            storage.save_tasks(&[make_task("dl-0000000001", "Persisted")]).unwrap();
        }

        let storage = Storage::open(temp_dir.path()).unwrap();
        let loaded = storage.load_tasks().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "Persisted");
    }

    #[test]
    fn test_corrupt_snapshot_degrades_to_empty() {
        let (_temp_dir, storage) = setup_test_storage();

        storage.set_meta(TASKS_KEY, "not valid json {{{").unwrap();

        let loaded = storage.load_tasks().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_garbage_database_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Storage::init(temp_dir.path()).unwrap();
            storage.save_tasks(&[make_task("dl-0000000001", "Persisted")]).unwrap();
            storage.set_last_reset("2026-08-30").unwrap();
        }

        let db_path = temp_dir.path().join(DAYLIST_DIR).join(DB_FILE);
        fs::write(&db_path, b"this is not a sqlite database").unwrap();

        // Open degrades to the in-memory default instead of failing
        let storage = Storage::open(temp_dir.path()).unwrap();
        assert!(storage.load_tasks().unwrap().is_empty());
        assert!(storage.last_reset().unwrap().is_none());

        // Writes keep working against the fallback
        storage.save_tasks(&[make_task("dl-0000000002", "New")]).unwrap();
        assert_eq!(storage.load_tasks().unwrap().len(), 1);
    }

    #[test]
    fn test_last_reset_roundtrip() {
        let (_temp_dir, storage) = setup_test_storage();

        assert!(storage.last_reset().unwrap().is_none());

        storage.set_last_reset("2026-08-30").unwrap();
        assert_eq!(storage.last_reset().unwrap().as_deref(), Some("2026-08-30"));

        storage.set_last_reset("2026-08-31").unwrap();
        assert_eq!(storage.last_reset().unwrap().as_deref(), Some("2026-08-31"));
    }
}
