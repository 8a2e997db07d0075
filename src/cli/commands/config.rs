//! Config command - show current configuration

use crate::cli::output::{colors, print_header, print_json};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the configuration as TOML
    #[arg(long)]
    pub toml: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub config_file_exists: bool,
    pub chunking_mode: Option<String>,
    #[serde(flatten)]
    pub config: Config,
}

/// Execute the config command
pub fn execute(
    args: ConfigArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.toml {
        print!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    let config_file = XdgDirs::new().config_file();
    let response = ConfigResponse {
        config_file_exists: config_file.exists(),
        config_file: config_file.to_string_lossy().into_owned(),
        chunking_mode: config.chunking_mode().ok().map(|m| m.to_string()),
        config: config.clone(),
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => print_json(&response),
    }

    Ok(())
}

fn print_human(response: &ConfigResponse) {
    let config = &response.config;

    print_header("Configuration:");
    let status = if response.config_file_exists {
        ""
    } else {
        " (not found, using defaults)"
    };
    println!(
        "  config_file: {}{}",
        colors::file_path(&response.config_file),
        colors::dim(status)
    );
    println!(
        "  chunking_mode: {}",
        response.chunking_mode.as_deref().unwrap_or("<unset>")
    );
    println!("  filter:");
    println!("    ignore: {:?}", config.filter.ignore);
    println!("    unignore: {:?}", config.filter.unignore);
    println!(
        "    binary_extensions: {:?}",
        config.filter.binary_extensions
    );
    println!("    priority_rules: {:?}", config.filter.priority_rules);
    if let Some(ext) = &config.filter.file_type {
        println!("    file_type: {ext}");
    }
    println!("  loader:");
    println!("    workers: {}", config.loader.workers);
    println!("  output:");
    println!("    target: {}", config.output_target());
    println!("    on_write_error: {:?}", config.output.on_write_error);
    println!("  enhance:");
    println!("    enabled: {}", config.enhance.enabled);
    println!("    min_relevance: {}", config.enhance.min_relevance);
    println!("    redact_secrets: {}", config.enhance.redact_secrets);
}
