//! CLI argument parsing for daylist.

use clap::{Parser, Subcommand};
use eyre::{Result, bail};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dl",
    about = "A day-scoped todo list that resets every morning",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/daylist/logs/daylist.log"
)]
pub struct Cli {
    /// Path to the daylist store directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new daylist store in the current directory
    Init,

    /// Add a task
    Add {
        /// Task text
        text: String,

        /// Weekdays the task applies to, comma-separated (e.g. mon,wed,fri
        /// or 1,3,5). Omit or pass "all" for every day.
        #[arg(long)]
        days: Option<String>,
    },

    /// List all tasks with their positions
    List {
        /// Show only completed tasks
        #[arg(short, long)]
        completed: bool,
    },

    /// Show what applies today
    Today,

    /// Toggle a task done/undone
    Done {
        /// Task ID
        id: String,
    },

    /// Replace a task's text
    Edit {
        /// Task ID
        id: String,

        /// New text
        text: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },

    /// Move a task up or down the list
    Move {
        /// Position in the list (from `dl list`)
        index: usize,

        /// Direction: up or down
        direction: String,
    },

    /// Run the daily reset check now
    Reset,

    /// Run the daemon in foreground
    Daemon,

    /// Stop the running daemon
    DaemonStop,

    /// Check daemon status
    DaemonStatus,
}

/// Parse a comma-separated day list into weekday indices (0 = Sunday).
/// Accepts day names ("mon", "monday"), digits ("1"), or "all" / "" for the
/// empty every-day set.
pub fn parse_days(input: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Ok(Vec::new());
    }

    let mut days = Vec::new();
    for part in input.split(',') {
        let part = part.trim().to_ascii_lowercase();
        let day = match part.as_str() {
            "0" | "sun" | "sunday" => 0,
            "1" | "mon" | "monday" => 1,
            "2" | "tue" | "tuesday" => 2,
            "3" | "wed" | "wednesday" => 3,
            "4" | "thu" | "thursday" => 4,
            "5" | "fri" | "friday" => 5,
            "6" | "sat" | "saturday" => 6,
            other => bail!("unknown day '{}': use sun..sat or 0..6", other),
        };
        days.push(day);
    }

    days.sort_unstable();
    days.dedup();
    Ok(days)
}
