mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spaced", about = "Spaced-repetition flashcards", version)]
struct Cli {
    /// Directory holding deck files (overrides the config file)
    #[arg(long, global = true)]
    decks_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

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
    /// List decks with their card and due counts
    List,

    /// Add a card to a deck (prompts for missing sides)
    Add {
        /// Deck name
        deck: String,
        /// Question side
        #[arg(long)]
        front: Option<String>,
        /// Answer side
        #[arg(long)]
        back: Option<String>,
    },

    /// Review the cards due today
    Review {
        /// Deck name
        deck: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.decks_dir)?;

    match cli.command {
        Command::List => {
            commands::list::run(&app, &cli.format)?;
        }
        Command::Add { deck, front, back } => {
            commands::add::run(&app, &deck, front, back, &cli.format)?;
        }
        Command::Review { deck } => {
            commands::review::run(&app, &deck, &cli.format, use_color)?;
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
