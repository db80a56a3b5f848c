//! Atelier CLI - command-line interface for the Atelier pipeline

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Turn short ideas into generated images and 3D models", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter .atelier/config.toml
    Init,

    /// Run the creative pipeline for a prompt
    Create {
        /// The idea to turn into artifacts
        prompt: String,

        /// User identifier recorded with the creation
        #[arg(long, default_value = atelier_core::DEFAULT_USER_ID)]
        user: String,

        /// Invoker to use (http or mock), overriding config
        #[arg(long)]
        invoker: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent creations, newest first
    Recent {
        /// Maximum number of rows
        #[arg(long, default_value_t = 5)]
        limit: u32,

        /// Only show creations for this user
        #[arg(long)]
        user: Option<String>,
    },

    /// Search creation history by substring
    Search {
        /// Term matched against prompts and tags
        term: String,

        /// Only search creations for this user
        #[arg(long)]
        user: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Create {
            prompt,
            user,
            invoker,
            json,
        } => commands::create::run(&prompt, &user, invoker.as_deref(), json),
        Commands::Recent { limit, user } => commands::history::recent(limit, user.as_deref()),
        Commands::Search { term, user } => commands::history::search(&term, user.as_deref()),
    }
}
