mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "memodrill-cli", about = "Timed card drills and viewing-time analytics", version)]
struct Cli {
    /// Use a specific data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run an interactive drill
    Train {
        /// Comma-separated focus cards, e.g. "QS,KC" (omit for a standard deck)
        #[arg(long)]
        focus: Option<String>,
    },

    /// Analyse one session (default: the most recent)
    Analyze {
        /// Session id (prefix match)
        #[arg(long)]
        session: Option<String>,
    },

    /// Totals, best speed and progress trend across all sessions
    Dashboard,

    /// List stored sessions, newest first
    History {
        /// Maximum sessions to list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build and print a deck without training
    Deck {
        /// Comma-separated focus cards
        #[arg(long)]
        focus: Option<String>,
        /// Deck size for a focused deck (default: focusedDeckSize from config)
        #[arg(long)]
        size: Option<usize>,
        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();

    match cli.command {
        Command::Train { focus } => {
            let mut app = app::App::new(cli.data_dir.as_deref())?;
            commands::train::run(&mut app, focus.as_deref(), &cli.format, use_color)?;
        }
        Command::Analyze { session } => {
            let app = app::App::new(cli.data_dir.as_deref())?;
            commands::analyze::run(&app, session.as_deref(), &cli.format, use_color)?;
        }
        Command::Dashboard => {
            let app = app::App::new(cli.data_dir.as_deref())?;
            commands::dashboard::run(&app, &cli.format, use_color)?;
        }
        Command::History { limit } => {
            let app = app::App::new(cli.data_dir.as_deref())?;
            commands::history::run(&app, limit, &cli.format)?;
        }
        Command::Deck { focus, size, seed } => {
            let app = app::App::new(cli.data_dir.as_deref())?;
            commands::deck::run(&app, focus.as_deref(), size, seed, &cli.format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
