use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use marchelo_core::config::{AppConfig, LoadOptions, CONFIG_FILE_NAME};
use toml::Value;

use super::{CommandResult, EXIT_CONFIG};

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let message = error.to_string();
            return CommandResult::failure("config", "config_validation", message, EXIT_CONFIG);
        }
    };

    let file_path = detect_config_path();
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(&field, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", field.key_path, field.value));
    }

    if config.pricing.destinations.is_empty() {
        lines.push("- pricing.destinations = <none> (canonical zones only)".to_string());
    }
    for (name, multiplier) in &config.pricing.destinations {
        lines.push(format!("- pricing.destinations.{name} = {multiplier} (source: file)"));
    }

    CommandResult::text(lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "server.bind_address",
            env_keys: &["MARCHELO_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["MARCHELO_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "server.graceful_shutdown_secs",
            env_keys: &["MARCHELO_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        Field {
            key_path: "pricing.unknown_type_policy",
            env_keys: &["MARCHELO_PRICING_UNKNOWN_TYPE_POLICY"],
            value: config.pricing.unknown_type_policy.as_str().to_string(),
        },
        Field {
            key_path: "tracking.live_update_after_mins",
            env_keys: &["MARCHELO_TRACKING_LIVE_UPDATE_AFTER_MINS"],
            value: config.tracking.live_update_after_mins.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["MARCHELO_LOGGING_LEVEL", "MARCHELO_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["MARCHELO_LOGGING_FORMAT", "MARCHELO_LOG_FORMAT"],
            value: config.logging.format.as_str().to_string(),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    fs::read_to_string(path).ok()?.parse::<Value>().ok()
}

fn field_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if file_doc.is_some_and(|doc| contains_path(doc, field.key_path)) {
        let file_path = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
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
