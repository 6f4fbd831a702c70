//! Background daemon for the daylist store.
//!
//! The daemon provides:
//! - A single writer owning the store (prevents concurrent mutation)
//! - The daily reset timer, armed for the next local midnight
//! - Line-delimited JSON request handling over a Unix socket

use crate::filter::{partition_for_day, today_index};
use crate::protocol::{Request, Response};
use crate::reset::delay_until_next_midnight;
use crate::store::TaskStore;
use chrono::Local;
use eyre::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Socket file name within the .daylist directory.
const SOCKET_FILE: &str = "daemon.sock";

/// PID file name within the .daylist directory.
const PID_FILE: &str = "daemon.pid";

/// Configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Root directory containing .daylist
    pub root: PathBuf,
}

impl DaemonConfig {
    /// Create config for the given store root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the socket path.
    pub fn socket_path(&self) -> PathBuf {
        self.root.join(".daylist").join(SOCKET_FILE)
    }

    /// Get the PID file path.
    pub fn pid_path(&self) -> PathBuf {
        self.root.join(".daylist").join(PID_FILE)
    }
}

/// The daylist daemon.
pub struct Daemon {
    config: DaemonConfig,
    store: TaskStore,
    shutdown: Arc<AtomicBool>,
}

impl Daemon {
    /// Create a new daemon instance.
    pub fn new(config: DaemonConfig) -> Result<Self> {
        let store = TaskStore::open(&config.root).context("Failed to open store")?;

        Ok(Self {
            config,
            store,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get a shutdown handle that can be used to signal shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the daemon (blocking).
    pub async fn run(&mut self) -> Result<()> {
        // Clean up any stale socket
        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            fs::remove_file(&socket_path).ok();
        }

        // Write PID file
        let pid_path = self.config.pid_path();
        fs::write(&pid_path, std::process::id().to_string()).context("Failed to write PID file")?;

        // Create Unix socket listener
        let listener = UnixListener::bind(&socket_path).context("Failed to bind to Unix socket")?;
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking")?;

        log::info!("Daemon listening on {:?}", socket_path);

        // Catch up on any reset missed while the daemon was down
        if let Err(e) = self.store.reset_if_due() {
            log::warn!("Startup reset check failed: {}", e);
        }

        // Create channel for client requests
        let (tx, mut rx) = mpsc::channel::<(Request, mpsc::Sender<Response>)>(100);

        // Spawn connection acceptor task
        let shutdown_flag = Arc::clone(&self.shutdown);
        let tx_clone = tx.clone();
        tokio::spawn(async move {
            Self::accept_connections(listener, tx_clone, shutdown_flag).await;
        });

        // Main event loop: requests plus the midnight reset timer
        loop {
            let reset_delay = delay_until_next_midnight(Local::now());

            tokio::select! {
                // Handle incoming request
                Some((request, response_tx)) = rx.recv() => {
                    let response = self.handle_request(request);
                    let _ = response_tx.send(response).await;
                }

                // Day boundary: flip everything back to undone
                _ = tokio::time::sleep(reset_delay) => {
                    if let Err(e) = self.store.reset_if_due() {
                        log::warn!("Daily reset check failed: {}", e);
                    }
                }
            }

            // Check shutdown flag
            if self.shutdown.load(Ordering::Relaxed) {
                log::info!("Daemon shutting down");
                break;
            }
        }

        // Cleanup
        fs::remove_file(&socket_path).ok();
        fs::remove_file(&pid_path).ok();

        Ok(())
    }

    /// Accept connections in a background task.
    async fn accept_connections(
        listener: UnixListener,
        tx: mpsc::Sender<(Request, mpsc::Sender<Response>)>,
        shutdown: Arc<AtomicBool>,
    ) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Try to accept connection with a small delay to allow checking shutdown
            match listener.accept() {
                Ok((stream, _)) => {
                    let tx_clone = tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream, tx_clone).await {
                            log::warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No pending connections, sleep briefly
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Handle a single client connection.
    async fn handle_connection(stream: UnixStream, tx: mpsc::Sender<(Request, mpsc::Sender<Response>)>) -> Result<()> {
        stream.set_nonblocking(false)?;

        let reader = BufReader::new(stream.try_clone()?);
        let mut writer = stream;

        for line in reader.lines() {
            let line = line.context("Failed to read line")?;
            if line.is_empty() {
                continue;
            }

            let request: Request = serde_json::from_str(&line).context("Failed to parse request")?;

            // Check for shutdown request
            let is_shutdown = matches!(request, Request::Shutdown);

            // Send to main loop and wait for response
            let (resp_tx, mut resp_rx) = mpsc::channel(1);
            tx.send((request, resp_tx))
                .await
                .context("Failed to send request to daemon")?;

            if let Some(response) = resp_rx.recv().await {
                let response_json = serde_json::to_string(&response)?;
                writeln!(writer, "{}", response_json)?;
                writer.flush()?;
            }

            if is_shutdown {
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request.
    fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::Add { text, days } => match self.store.add(&text, &days) {
                Ok(task) => Response::Task { task },
                Err(e) => Response::error(e.to_string()),
            },

            Request::Delete { id } => {
                if self.store.delete(&id) {
                    Response::Ok
                } else {
                    Response::NotFound { id }
                }
            }

            Request::Edit { id, text } => match self.store.edit(&id, &text) {
                Ok(true) => Response::Ok,
                Ok(false) => Response::NotFound { id },
                Err(e) => Response::error(e.to_string()),
            },

            Request::Toggle { id } => match self.store.toggle(&id) {
                Some(_) => match self.store.get(&id) {
                    Some(task) => Response::Task { task: task.clone() },
                    None => Response::NotFound { id },
                },
                None => Response::NotFound { id },
            },

            Request::Move { index, direction } => {
                if self.store.move_task(index, direction) {
                    Response::Ok
                } else {
                    Response::Noop
                }
            }

            Request::Get { id } => match self.store.get(&id) {
                Some(task) => Response::Task { task: task.clone() },
                None => Response::NotFound { id },
            },

            Request::List => Response::Tasks {
                tasks: self.store.tasks().as_ref().clone(),
            },

            Request::Today => Response::Today {
                view: partition_for_day(&self.store.tasks(), today_index()),
            },

            Request::Reset => match self.store.reset_if_due() {
                Ok(fired) => Response::Reset { fired },
                Err(e) => Response::error(e.to_string()),
            },

            Request::Shutdown => {
                self.shutdown.store(true, Ordering::Relaxed);
                Response::Ok
            }

            Request::Ping => Response::Pong,
        }
    }
}

/// Check if a daemon is running for the given store path.
pub fn is_daemon_running(root: &Path) -> bool {
    let config = DaemonConfig::new(root);
    let socket_path = config.socket_path();
    let pid_path = config.pid_path();

    // Check if socket exists
    if !socket_path.exists() {
        return false;
    }

    // Check if PID file exists and process is alive
    if let Ok(pid_str) = fs::read_to_string(&pid_path)
        && let Ok(pid) = pid_str.trim().parse::<i32>()
    {
        // Check if process exists (signal 0 doesn't send a signal but checks existence)
        unsafe {
            if libc::kill(pid, 0) == 0 {
                return true;
            }
        }
    }

    // Stale socket, clean up
    fs::remove_file(&socket_path).ok();
    fs::remove_file(&pid_path).ok();
    false
}

/// Start the daemon as a background process.
pub fn start_daemon(root: &Path) -> Result<()> {
    use std::process::Command;

    // Get the path to the current executable
    let exe = std::env::current_exe().context("Failed to get current executable")?;

    // Start daemon in background
    Command::new(exe)
        .args(["--dir", root.to_str().unwrap_or("."), "daemon"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .context("Failed to spawn daemon process")?;

    // Wait a bit for daemon to start
    std::thread::sleep(Duration::from_millis(100));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        TaskStore::init(&root).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_daemon_config() {
        let config = DaemonConfig::new("/test/path");
        assert_eq!(config.socket_path(), PathBuf::from("/test/path/.daylist/daemon.sock"));
        assert_eq!(config.pid_path(), PathBuf::from("/test/path/.daylist/daemon.pid"));
    }

    #[test]
    fn test_daemon_creation() {
        let (_temp_dir, root) = setup_test_store();
        let config = DaemonConfig::new(&root);
        let daemon = Daemon::new(config);
        assert!(daemon.is_ok());
    }

    #[test]
    fn test_is_daemon_running_false() {
        let (_temp_dir, root) = setup_test_store();
        assert!(!is_daemon_running(&root));
    }

    #[test]
    fn test_handle_request_roundtrip() {
        let (_temp_dir, root) = setup_test_store();
        let mut daemon = Daemon::new(DaemonConfig::new(&root)).unwrap();

        let response = daemon.handle_request(Request::Add {
            text: "Water plants".to_string(),
            days: vec![1, 3, 5],
        });
        let id = match response {
            Response::Task { task } => task.id,
            other => panic!("Unexpected response: {:?}", other),
        };

        assert!(matches!(
            daemon.handle_request(Request::Toggle { id: id.clone() }),
            Response::Task { .. }
        ));
        assert!(matches!(daemon.handle_request(Request::Delete { id }), Response::Ok));
        assert!(matches!(
            daemon.handle_request(Request::Delete {
                id: "dl-0000000000".to_string()
            }),
            Response::NotFound { .. }
        ));
    }

    #[test]
    fn test_handle_move_out_of_bounds_is_noop() {
        let (_temp_dir, root) = setup_test_store();
        let mut daemon = Daemon::new(DaemonConfig::new(&root)).unwrap();

        let response = daemon.handle_request(Request::Move {
            index: 9,
            direction: crate::types::Direction::Up,
        });
        assert!(matches!(response, Response::Noop));
    }
}
