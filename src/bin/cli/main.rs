mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use flashdeck_lib::AppConfig;

#[derive(Parser)]
#[command(name = "flashdeck-cli", about = "Flashcard decks with study sessions", version)]
struct Cli {
    /// Directory holding the stored data (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/flashdeck/config.toml)
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
    /// Create an account and sign in
    Register {
        /// Display name (at least 2 characters)
        name: String,
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with email and password
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Change your name or email
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// List your decks with totals
    Decks,

    /// Create, edit, show, delete or export a deck
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Add, edit or delete flashcards
    #[command(subcommand)]
    Card(CardCommand),

    /// Study a deck interactively
    Study {
        /// Deck name (case-insensitive prefix match)
        deck: String,
    },

    /// Show or toggle the color theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck (name and description default to the saved draft)
    Create {
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename a deck or change its description
    Edit {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Show a deck and its cards
    Show {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Only cards whose front or back contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Delete a deck and all its cards
    Delete {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Write a deck to <name>_flashcards.json
    Export {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Output directory (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card (sides default to the saved draft)
    Add {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        front: Option<String>,
        back: Option<String>,
    },

    /// Change a card's front or back
    Edit {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Card number as listed by `deck show`, or an id prefix
        card: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Card number as listed by `deck show`, or an id prefix
        card: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    let mut app = app::App::new(config)?;
    let result = run(&mut app, cli.command, &cli.format, use_color).await;

    // Pending deck edits are written even when the command failed
    app.shutdown().await;
    result
}

async fn run(
    app: &mut app::App,
    command: Command,
    format: &OutputFormat,
    use_color: bool,
) -> anyhow::Result<()> {
    match command {
        Command::Register { name, email, password } => {
            commands::auth::run_register(app, name, email, password, format).await
        }
        Command::Login { email, password } => {
            commands::auth::run_login(app, email, password, format).await
        }
        Command::Logout => commands::auth::run_logout(app).await,
        Command::Whoami => commands::auth::run_whoami(app, format),
        Command::Profile { name, email } => {
            commands::auth::run_profile(app, name, email, format).await
        }
        Command::Decks => commands::decks::run_list(app, format, use_color),
        Command::Deck(subcmd) => match subcmd {
            DeckCommand::Create { name, description } => {
                commands::decks::run_create(app, name, description, format)
            }
            DeckCommand::Edit { deck, name, description } => {
                commands::decks::run_edit(app, &deck, name, description, format)
            }
            DeckCommand::Show { deck, search } => {
                commands::decks::run_show(app, &deck, search.as_deref(), format, use_color)
            }
            DeckCommand::Delete { deck, yes } => commands::decks::run_delete(app, &deck, yes).await,
            DeckCommand::Export { deck, out } => {
                commands::decks::run_export(app, &deck, out, format)
            }
        },
        Command::Card(subcmd) => match subcmd {
            CardCommand::Add { deck, front, back } => {
                commands::cards::run_add(app, &deck, front, back, format)
            }
            CardCommand::Edit { deck, card, front, back } => {
                commands::cards::run_edit(app, &deck, &card, front, back, format)
            }
            CardCommand::Delete { deck, card } => commands::cards::run_delete(app, &deck, &card),
        },
        Command::Study { deck } => commands::study::run(app, &deck, use_color),
        Command::Theme { toggle } => commands::theme::run(app, toggle, format),
    }
}
