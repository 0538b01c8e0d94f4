pub mod catalog;
pub mod config;
pub mod doctor;
pub mod quote;

use std::path::Path;

use quotesmith_core::config::{AppConfig, LoadOptions};
use quotesmith_core::{ApplicationError, Catalog, FileCatalogSource, InterfaceError};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG_UNAVAILABLE: u8 = 3;
pub const EXIT_QUOTE_UNAVAILABLE: u8 = 4;
pub const EXIT_OUTPUT: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn raw(output: String) -> Self {
        Self { exit_code: 0, output }
    }

    /// Maps an application failure onto the user-facing unavailability message.
    pub fn unavailable(command: &str, error: ApplicationError) -> Self {
        let interface = InterfaceError::from(error);
        let (error_class, exit_code) = match interface {
            InterfaceError::CatalogUnavailable { .. } => {
                ("catalog_unavailable", EXIT_CATALOG_UNAVAILABLE)
            }
            InterfaceError::QuoteUnavailable { .. } => {
                ("quote_unavailable", EXIT_QUOTE_UNAVAILABLE)
            }
            InterfaceError::Internal { .. } => ("internal", EXIT_CONFIG),
        };
        let message = format!("{} ({interface})", interface.user_message());
        Self::failure(command, error_class, message, exit_code)
    }
}

pub(crate) fn load_config(command: &str, options: LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

/// Runs the single awaited catalog fetch on a current-thread runtime.
pub(crate) fn load_catalog_blocking(path: &Path) -> Result<Catalog, ApplicationError> {
    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            ApplicationError::CatalogSource(format!("failed to initialize async runtime: {error}"))
        })?;

    let source = FileCatalogSource::new(path);
    runtime.block_on(async { quotesmith_core::load_catalog(&source).await })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
