use std::env;
use std::fs;
use std::path::Path;

use quotesmith_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_path = options.config_path.clone();
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = resolve_config_path(config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult::raw(lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    vec![
        ConfigField {
            key_path: "catalog.path",
            env_keys: &["QUOTESMITH_CATALOG_PATH"],
            value: config.catalog.path.display().to_string(),
        },
        ConfigField {
            key_path: "pricing.hourly_rate",
            env_keys: &["QUOTESMITH_PRICING_HOURLY_RATE"],
            value: config.pricing.hourly_rate.to_string(),
        },
        ConfigField {
            key_path: "pricing.addon_install",
            env_keys: &["QUOTESMITH_PRICING_ADDON_INSTALL"],
            value: config.pricing.addon_install.to_string(),
        },
        ConfigField {
            key_path: "pricing.addon_config",
            env_keys: &["QUOTESMITH_PRICING_ADDON_CONFIG"],
            value: config.pricing.addon_config.to_string(),
        },
        ConfigField {
            key_path: "pricing.addon_network",
            env_keys: &["QUOTESMITH_PRICING_ADDON_NETWORK"],
            value: config.pricing.addon_network.to_string(),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["QUOTESMITH_LOGGING_LEVEL", "QUOTESMITH_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["QUOTESMITH_LOGGING_FORMAT", "QUOTESMITH_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_lowercase(),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
