//! daylist CLI - a day-scoped todo list that resets every morning.

use clap::Parser;
use colored::*;
use daylist::filter::{partition_for_day, today_index};
use daylist::{Client, Daemon, DaemonConfig, Direction, Status, Task, TaskStore, day_name, is_daemon_running};
use eyre::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::{Cli, Command, parse_days};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daylist")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("daylist.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_store_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Open the store and run the catch-up reset check, exactly what the view
/// layer does on load.
fn open_store(dir: &Path) -> Result<TaskStore> {
    let mut store = TaskStore::open(dir).context("Failed to open store")?;
    store.reset_if_due().context("Failed to run reset check")?;
    Ok(store)
}

fn format_status(status: &Status) -> ColoredString {
    match status {
        Status::Undone => "undone".yellow(),
        Status::Completed => "completed".green(),
    }
}

fn format_days(task: &Task) -> String {
    if task.days.is_empty() {
        "every day".to_string()
    } else {
        task.days.iter().map(|&d| day_name(d)).collect::<Vec<_>>().join(", ")
    }
}

fn print_task_line(index: usize, task: &Task) {
    println!(
        "{:>3}. {} {} {} {}",
        index,
        format_status(&task.status),
        task.id.cyan(),
        task.text,
        format!("[{}] day {}", format_days(task), task.count).dimmed()
    );
}

fn run(cli: Cli) -> Result<()> {
    let store_dir = get_store_dir(&cli);

    match cli.command {
        Command::Init => {
            let mut store = TaskStore::init(&store_dir).context("Failed to initialize daylist store")?;
            // Record today as the baseline so the first midnight boundary is
            // the first reset
            store.reset_if_due().context("Failed to record reset baseline")?;
            println!("{} Initialized daylist store in {}", "✓".green(), store_dir.display());
        }

        Command::Add { text, days } => {
            let mut store = open_store(&store_dir)?;
            let days = parse_days(days.as_deref().unwrap_or("all"))?;

            let task = store.add(&text, &days).context("Failed to add task")?;

            println!(
                "{} Added: {} {} {}",
                "✓".green(),
                task.id.cyan(),
                task.text,
                format!("[{}]", format_days(&task)).dimmed()
            );
        }

        Command::List { completed } => {
            let store = open_store(&store_dir)?;
            let tasks = store.tasks();

            let visible: Vec<(usize, &Task)> = tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| !completed || t.status == Status::Completed)
                .collect();

            if visible.is_empty() {
                println!("{}", "No tasks".dimmed());
            } else {
                for (index, task) in visible {
                    print_task_line(index, task);
                }
            }
        }

        Command::Today => {
            let store = open_store(&store_dir)?;
            let today = today_index();
            let view = partition_for_day(&store.tasks(), today);

            println!("{} {}:", "Today".bold(), day_name(today));

            if view.undone.is_empty() {
                println!("{}", "You finished all your tasks! Great job!".green());
            } else {
                for task in &view.undone {
                    println!("  {} {} {}", "○".yellow(), task.id.cyan(), task.text);
                }
            }

            if !view.completed.is_empty() {
                println!("{}", format!("{} done:", view.completed.len()).dimmed());
                for task in &view.completed {
                    println!("  {} {} {}", "●".green(), task.id.cyan(), task.text.dimmed());
                }
            }
        }

        Command::Done { id } => {
            let mut store = open_store(&store_dir)?;

            match store.toggle(&id) {
                Some(Status::Completed) => println!("{} Completed: {}", "✓".green(), id.cyan()),
                Some(Status::Undone) => println!("{} Back to undone: {}", "○".yellow(), id.cyan()),
                None => {
                    eprintln!("{} Task not found: {}", "✗".red(), id);
                    std::process::exit(1);
                }
            }
        }

        Command::Edit { id, text } => {
            let mut store = open_store(&store_dir)?;

            if store.edit(&id, &text).context("Failed to edit task")? {
                println!("{} Edited: {} {}", "✓".green(), id.cyan(), text);
            } else {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
        }

        Command::Rm { id } => {
            let mut store = open_store(&store_dir)?;

            if store.delete(&id) {
                println!("{} Deleted: {}", "✓".green(), id.cyan());
            } else {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
        }

        Command::Move { index, direction } => {
            let mut store = open_store(&store_dir)?;
            let direction = match direction.to_ascii_lowercase().as_str() {
                "up" => Direction::Up,
                "down" => Direction::Down,
                other => bail!("unknown direction '{}': use up or down", other),
            };

            if store.move_task(index, direction) {
                println!("{} Moved task at position {}", "✓".green(), index);
            } else {
                println!("{}", format!("No move: position {} has no neighbor there", index).dimmed());
            }
        }

        Command::Reset => {
            let mut store = TaskStore::open(&store_dir).context("Failed to open store")?;

            if store.reset_if_due().context("Failed to run reset check")? {
                println!("{} Daily reset applied", "✓".green());
            } else {
                println!("{}", "Already reset today".dimmed());
            }
        }

        Command::Daemon => {
            println!("{} Starting daemon for {}", "→".blue(), store_dir.display());

            let config = DaemonConfig::new(&store_dir);
            let mut daemon = Daemon::new(config).context("Failed to create daemon")?;

            // Run daemon in async runtime
            let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
            rt.block_on(async { daemon.run().await }).context("Daemon error")?;
        }

        Command::DaemonStop => {
            if !is_daemon_running(&store_dir) {
                println!("{} Daemon is not running", "✗".red());
                std::process::exit(1);
            }

            let mut client = Client::connect(&store_dir, false).context("Failed to connect to daemon")?;
            client.shutdown().context("Failed to shutdown daemon")?;
            println!("{} Daemon stopped", "✓".green());
        }

        Command::DaemonStatus => {
            if is_daemon_running(&store_dir) {
                println!("{} Daemon is running", "✓".green());

                // Try to ping
                if let Ok(mut client) = Client::connect(&store_dir, false)
                    && client.ping().is_ok()
                {
                    println!("  {} Responding to requests", "✓".green());
                }
            } else {
                println!("{} Daemon is not running", "✗".red());
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
