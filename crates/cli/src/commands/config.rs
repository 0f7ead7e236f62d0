use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rentdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// One reported setting: dotted key, the environment variables that can set it, rendered value.
struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: overrides > env > file > default):".to_string(),
    ];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let field = |key: &'static str, env_keys: &'static [&'static str], value: String| Field {
        key,
        env_keys,
        value,
    };

    vec![
        field("database.url", &["RENTDESK_DATABASE_URL"], config.database.url.clone()),
        field(
            "database.max_connections",
            &["RENTDESK_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections.to_string(),
        ),
        field(
            "database.timeout_secs",
            &["RENTDESK_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs.to_string(),
        ),
        field("llm.provider", &["RENTDESK_LLM_PROVIDER"], format!("{:?}", config.llm.provider)),
        field("llm.model", &["RENTDESK_LLM_MODEL"], config.llm.model.clone()),
        field(
            "llm.base_url",
            &["RENTDESK_LLM_BASE_URL"],
            config.llm.base_url.clone().unwrap_or_else(|| {
                format!("<provider default: {}>", config.llm.effective_base_url())
            }),
        ),
        field(
            "llm.api_key",
            &["RENTDESK_LLM_API_KEY", "GROQ_API_KEY"],
            if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" }.to_string(),
        ),
        field(
            "llm.timeout_secs",
            &["RENTDESK_LLM_TIMEOUT_SECS"],
            config.llm.timeout_secs.to_string(),
        ),
        field(
            "llm.temperature",
            &["RENTDESK_LLM_TEMPERATURE"],
            config.llm.temperature.to_string(),
        ),
        field(
            "server.bind_address",
            &["RENTDESK_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        field("server.port", &["RENTDESK_SERVER_PORT"], config.server.port.to_string()),
        field(
            "server.graceful_shutdown_secs",
            &["RENTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        field(
            "assistant.entity_matching",
            &["RENTDESK_ASSISTANT_ENTITY_MATCHING"],
            format!("{:?}", config.assistant.entity_matching),
        ),
        field(
            "logging.level",
            &["RENTDESK_LOGGING_LEVEL", "RENTDESK_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        field(
            "logging.format",
            &["RENTDESK_LOGGING_FORMAT", "RENTDESK_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("rentdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/rentdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
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

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_toml_document() {
        let doc: toml::Value = "[llm]\nmodel = \"llama3.1\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
    }

    #[test]
    fn file_source_is_reported_when_key_present() {
        let doc: toml::Value = "[server]\nport = 8080\n".parse().expect("toml");
        let source = field_source(
            "server.port",
            &["RENTDESK_TEST_UNSET_PORT"],
            Some(&doc),
            Some(std::path::Path::new("rentdesk.toml")),
        );
        assert_eq!(source, "file (rentdesk.toml)");
    }
}
