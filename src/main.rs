//! # FocusFlow
//!
//! A terminal weekly-schedule tracker. Define recurring time blocks for each
//! weekday and FocusFlow shows what you should be doing right now, what comes
//! next, and how far along the current block is.
//!
//! ## Features
//!
//! *   **Now / Next**: The active block (with a progress bar) and the next block today.
//! *   **Weekly reset**: Completion marks are cleared automatically every Monday.
//! *   **Dual Interface**:
//!     *   **CLI**: Scriptable and quick for single commands.
//!     *   **TUI**: A live dashboard that refreshes every second.
//! *   **Data Persistence**: Blocks are stored in standard XDG data directories (JSON format).
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! focusflow
//! # or explicitly
//! focusflow ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `j`/`k`: Move selection
//! *   `h`/`l`: Previous / next day
//! *   `Space`: Toggle done
//! *   `a`: Add block to the shown day
//! *   `n`/`s`/`e`/`o`: Edit name / start / end / note
//! *   `c`: Cycle colour
//! *   `d`: Delete block
//! *   `v`: Switch between day and week view
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! focusflow add "Deep Work" --day monday --start 10:00 --end 12:00 --note "Coding session"
//! focusflow now
//! focusflow list --day tue
//! focusflow week
//! focusflow toggle <ID>
//! ```
//!
//! Ids can be abbreviated to any unique prefix.
//!
//! ## Data Storage
//!
//! *   Linux: `~/.local/share/focusflow/tasks.json`
//! *   macOS: `~/Library/Application Support/focusflow/tasks.json`
//! *   Windows: `%APPDATA%\focusflow\tasks.json`
//!
//! Override the location with the `FOCUSFLOW_DB` environment variable. Set
//! `RUST_LOG` (e.g. `RUST_LOG=focusflow=debug`) for diagnostics.

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use focusflow::clock::SystemClock;
use focusflow::commands::*;
use focusflow::planner::Planner;
use focusflow::storage::JsonStorage;
use focusflow::tui::run_tui;

#[derive(Parser)]
#[command(name = "focusflow")]
#[command(about = "Weekly time-block tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current and next block
    Now,
    /// Add a new block
    Add {
        /// Block name (quoted if it has spaces)
        name: String,
        /// Weekday (defaults to today)
        #[arg(short, long)]
        day: Option<String>,
        /// Start time, HH:MM
        #[arg(short, long)]
        start: String,
        /// End time, HH:MM
        #[arg(short, long)]
        end: String,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
        /// Colour tag
        #[arg(short, long, value_parser = COLOR_NAMES)]
        color: Option<String>,
    },
    /// List one day's blocks (defaults to today)
    List {
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Show the whole week
    Week,
    /// Mark a block done, or undo that
    Toggle {
        id: String,
    },
    /// Edit a block
    Edit {
        id: String,
        #[arg(short = 'N', long)]
        name: Option<String>,
        #[arg(short, long)]
        day: Option<String>,
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        end: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long, value_parser = COLOR_NAMES)]
        color: Option<String>,
    },
    /// Remove a block
    Remove {
        id: String,
    },
    /// Delete the whole schedule
    Wipe {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> focusflow::Result<()> {
    let storage = JsonStorage::from_env();

    match &cli.command {
        Some(Commands::Wipe { force }) => return cmd_wipe(&storage, *force),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "focusflow", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let mut planner = Planner::open(Box::new(storage), Box::new(SystemClock))?;
    match cli.command {
        Some(Commands::Now) => cmd_now(&planner),
        Some(Commands::Add { name, day, start, end, note, color }) => cmd_add(&mut planner, name, day, start, end, note, color, false)?,
        Some(Commands::List { day }) => cmd_list(&planner, day)?,
        Some(Commands::Week) => cmd_week(&planner),
        Some(Commands::Toggle { id }) => cmd_toggle(&mut planner, &id, false)?,
        Some(Commands::Edit { id, name, day, start, end, note, color }) => cmd_edit(&mut planner, &id, name, day, start, end, note, color, false)?,
        Some(Commands::Remove { id }) => cmd_remove(&mut planner, &id, false)?,
        Some(Commands::Ui) | None => run_tui(planner)?,
        Some(Commands::Wipe { .. }) | Some(Commands::Completions { .. }) => {}
    }
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
