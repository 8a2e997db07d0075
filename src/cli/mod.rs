//! CLI adapter for Komodo
//!
//! Provides the command-line interface over `core/`. The adapter only
//! parses arguments, layers them over the loaded configuration and
//! formats results; all chunking logic lives in the core.
//!
//! # Architecture
//!
//! ```text
//! +------------------+      +------------------+
//! |      cli/        | ---> |     core/        |
//! | (clap adapter)   |      |  (domain logic)  |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Komodo - chunk directory trees for context-limited readers
///
/// Walks one or more directories, orders files by priority rules and
/// writes them out as framed chunks bounded by bytes, tokens, line-aligned
/// declarations or a fixed chunk count.
#[derive(Parser, Debug)]
#[command(name = "komodo")]
#[command(author = "Komodo Contributors")]
#[command(version)]
#[command(about = "Priority-ordered chunking of directory trees", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk one or more directories
    Chunk(commands::ChunkArgs),

    /// Show the effective configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  komodo completions bash > ~/.local/share/bash-completion/completions/komodo
    ///   zsh:   komodo completions zsh > ~/.zfunc/_komodo
    ///   fish:  komodo completions fish > ~/.config/fish/completions/komodo.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;

    // Handle completions command early (doesn't need configuration)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let config = Config::load()?;

    match cli.command {
        Commands::Chunk(args) => commands::chunk::execute(args, config, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &config, cli.format),
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}

/// Process exit status for an error returned by [`run`]
pub fn exit_code(error: &(dyn std::error::Error + 'static)) -> i32 {
    error
        .downcast_ref::<crate::core::error::KomodoError>()
        .map(|e| e.exit_code())
        .unwrap_or(1)
}
