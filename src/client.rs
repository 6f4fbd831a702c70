//! Client for connecting to the daylist daemon.

use crate::daemon::{DaemonConfig, is_daemon_running, start_daemon};
use crate::filter::DayView;
use crate::protocol::{Request, Response};
use crate::types::{Direction, Task};
use eyre::{Context, Result, bail};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client for communicating with the daylist daemon.
pub struct Client {
    root: PathBuf,
    stream: UnixStream,
}

impl Client {
    /// Connect to the daemon, optionally auto-starting it if not running.
    pub fn connect(root: &Path, auto_start: bool) -> Result<Self> {
        let config = DaemonConfig::new(root);
        let socket_path = config.socket_path();

        // Try to connect, auto-start if needed
        let stream = match UnixStream::connect(&socket_path) {
            Ok(stream) => stream,
            Err(_) if auto_start => {
                if !is_daemon_running(root) {
                    start_daemon(root).context("Failed to auto-start daemon")?;

                    // Wait for daemon to be ready
                    let mut attempts = 0;
                    loop {
                        if attempts > 20 {
                            bail!("Daemon failed to start in time");
                        }
                        std::thread::sleep(Duration::from_millis(50));
                        if let Ok(stream) = UnixStream::connect(&socket_path) {
                            break stream;
                        }
                        attempts += 1;
                    }
                } else {
                    UnixStream::connect(&socket_path).context("Failed to connect to daemon")?
                }
            }
            Err(e) => {
                bail!("Failed to connect to daemon: {}. Is it running?", e);
            }
        };

        // Set read timeout
        stream
            .set_read_timeout(Some(Duration::from_secs(30)))
            .context("Failed to set read timeout")?;

        Ok(Self {
            root: root.to_path_buf(),
            stream,
        })
    }

    /// Get the store root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Send a request and receive a response.
    fn request(&mut self, request: Request) -> Result<Response> {
        let request_json = serde_json::to_string(&request)?;
        writeln!(self.stream, "{}", request_json)?;
        self.stream.flush()?;

        let mut reader = BufReader::new(&self.stream);
        let mut response_line = String::new();
        reader.read_line(&mut response_line)?;

        let response: Response = serde_json::from_str(&response_line)?;
        Ok(response)
    }

    /// Add a new task.
    pub fn add(&mut self, text: &str, days: &[u8]) -> Result<Task> {
        let response = self.request(Request::Add {
            text: text.to_string(),
            days: days.to_vec(),
        })?;

        match response {
            Response::Task { task } => Ok(task),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Delete a task. Returns whether the task existed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let response = self.request(Request::Delete { id: id.to_string() })?;

        match response {
            Response::Ok => Ok(true),
            Response::NotFound { .. } => Ok(false),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Replace a task's text. Returns whether the task existed.
    pub fn edit(&mut self, id: &str, text: &str) -> Result<bool> {
        let response = self.request(Request::Edit {
            id: id.to_string(),
            text: text.to_string(),
        })?;

        match response {
            Response::Ok => Ok(true),
            Response::NotFound { .. } => Ok(false),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Toggle a task's status. Returns the updated task, or `None` if the
    /// ID is unknown.
    pub fn toggle(&mut self, id: &str) -> Result<Option<Task>> {
        let response = self.request(Request::Toggle { id: id.to_string() })?;

        match response {
            Response::Task { task } => Ok(Some(task)),
            Response::NotFound { .. } => Ok(None),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Swap a task with its neighbor. Returns whether anything moved.
    pub fn move_task(&mut self, index: usize, direction: Direction) -> Result<bool> {
        let response = self.request(Request::Move { index, direction })?;

        match response {
            Response::Ok => Ok(true),
            Response::Noop => Ok(false),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Get a task by ID.
    pub fn get(&mut self, id: &str) -> Result<Option<Task>> {
        let response = self.request(Request::Get { id: id.to_string() })?;

        match response {
            Response::Task { task } => Ok(Some(task)),
            Response::NotFound { .. } => Ok(None),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// List all tasks.
    pub fn list(&mut self) -> Result<Vec<Task>> {
        let response = self.request(Request::List)?;

        match response {
            Response::Tasks { tasks } => Ok(tasks),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Get the day-filtered view for the current weekday.
    pub fn today(&mut self) -> Result<DayView> {
        let response = self.request(Request::Today)?;

        match response {
            Response::Today { view } => Ok(view),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Run the daily reset check. Returns whether a reset fired.
    pub fn reset(&mut self) -> Result<bool> {
        let response = self.request(Request::Reset)?;

        match response {
            Response::Reset { fired } => Ok(fired),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Shutdown the daemon.
    pub fn shutdown(&mut self) -> Result<()> {
        let response = self.request(Request::Shutdown)?;

        match response {
            Response::Ok => Ok(()),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Ping the daemon.
    pub fn ping(&mut self) -> Result<()> {
        let response = self.request(Request::Ping)?;

        match response {
            Response::Pong => Ok(()),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }
}
