pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quotesmith_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

use crate::commands::quote::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "quotesmith",
    about = "Quotesmith quote generator",
    long_about = "Browse the product catalog, price a selection of products and service options, and export the quote summary.",
    after_help = "Examples:\n  quotesmith catalog\n  quotesmith quote --item LT-100=2 --addon addon-install --devices 3\n  quotesmith quote --selection selection.json --format csv --output quote_summary.csv\n  quotesmith doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List catalog categories and products with unit prices")]
    Catalog {
        #[arg(long, help = "Catalog JSON document (defaults to catalog.path from config)")]
        catalog: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Price a selection and print or export the quote summary")]
    Quote(QuoteArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog readability, and pricing rates")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = load_options(cli.config.clone());

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Catalog { catalog, json } => commands::catalog::run(options, catalog, json),
        Command::Quote(args) => commands::quote::run(options, &args),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// An explicit `--config` path must exist; without one the default locations are optional.
pub fn load_options(config_path: Option<PathBuf>) -> LoadOptions {
    let require_file = config_path.is_some();
    LoadOptions { config_path, require_file, ..LoadOptions::default() }
}

/// Diagnostics go to stderr so stdout only ever carries command output.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let outcome = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(error) = outcome {
        eprintln!("logging already initialized: {error}");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use quotesmith_core::config::{AppConfig, ConfigError};

    use super::load_options;

    #[test]
    fn explicit_config_path_is_required() {
        let options = load_options(Some(PathBuf::from("does-not-exist/quotesmith.toml")));
        assert!(options.require_file);

        let error = AppConfig::load(options).expect_err("missing explicit config must fail");
        assert!(matches!(error, ConfigError::MissingConfigFile(ref path)
            if path == &PathBuf::from("does-not-exist/quotesmith.toml")));
    }

    #[test]
    fn default_locations_stay_optional() {
        let options = load_options(None);
        assert!(!options.require_file);
        assert_eq!(options.config_path, None);
    }
}
