//! Komodo CLI - chunk directory trees from the command line
//!
//! # Examples
//!
//! ```bash
//! # 4 KiB chunks, Python first, into ./chunks
//! komodo chunk ./src --max-bytes 4096 --priority '*.py,10'
//!
//! # Exactly 8 chunks streamed to stdout
//! komodo chunk ./src ./docs --equal-chunks 8 --stream
//!
//! # See what would be chunked
//! komodo chunk . --semantic-lines 200 --dry-run
//! ```

use clap::Parser;
use komodo::cli::output::print_error;
use komodo::cli::{exit_code, run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "komodo=debug" } else { "komodo=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        // stdout may carry streamed chunks
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(exit_code(e.as_ref()));
    }
}
