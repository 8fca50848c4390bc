//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file (e.g. `~/.dadjoke/config.json`) and then
//! overridden by environment (`PORT`, `BASE_URL`, `OPENAI_API_KEY`, ...). The result is
//! resolved once at startup into an immutable [`RuntimeConfig`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder shipped in sample `.env` files; treated the same as no key.
pub const API_KEY_PLACEHOLDER: &str = "your_openai_api_key_here";

const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Top-level config file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion service used for topic jokes.
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// Server bind, port, public base URL and document location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Listen port (default 2009). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0" so tunnels and containers can reach the agent).
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL substituted into the agent card and discovery document.
    /// Overridden by BASE_URL env; defaults to `http://localhost:<port>`.
    pub base_url: Option<String>,

    /// Directory holding agent-card.json, agent-discovery.json, agent-manifest.json and
    /// declarative-agent.json. Overridden by DADJOKE_DOCUMENTS_DIR env; defaults to ".".
    pub documents_dir: Option<PathBuf>,
}

/// Completion service settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// API key. Overridden by OPENAI_API_KEY env. Absent or placeholder disables generation.
    pub api_key: Option<String>,

    /// API base URL (default https://api.openai.com/v1). Overridden by OPENAI_BASE_URL env.
    pub base_url: Option<String>,

    /// Model id (default gpt-3.5-turbo). Overridden by OPENAI_MODEL env.
    pub model: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_port() -> u16 {
    2009
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.8
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            base_url: None,
            documents_dir: None,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Resolved completion settings; present only when a usable credential is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Process-wide configuration, read once at startup and never reloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub bind: String,
    pub port: u16,
    pub base_url: String,
    pub documents_dir: PathBuf,
    pub completion: Option<CompletionSettings>,
}

/// Public URLs of every endpoint the agent serves, derived from the base URL.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointUrls {
    pub base_url: String,
    pub messaging: String,
    pub card: String,
    pub manifest: String,
    pub declarative: String,
    pub discovery: String,
    pub well_known_card: String,
    pub well_known_discovery: String,
    pub icon: String,
}

/// Trimmed, non-empty value or None.
fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

impl RuntimeConfig {
    /// Resolve from the config file and the process environment.
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve from the config file and an environment lookup. Env values win over the file.
    pub fn resolve_with(config: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let port = match env("PORT").and_then(|s| non_empty(&s)) {
            Some(p) => match p.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    log::warn!("ignoring invalid PORT {:?}, using {}", p, config.server.port);
                    config.server.port
                }
            },
            None => config.server.port,
        };

        let base_url = env("BASE_URL")
            .and_then(|s| non_empty(&s))
            .or_else(|| config.server.base_url.as_deref().and_then(non_empty))
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let documents_dir = env("DADJOKE_DOCUMENTS_DIR")
            .and_then(|s| non_empty(&s))
            .map(PathBuf::from)
            .or_else(|| config.server.documents_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let api_key = env("OPENAI_API_KEY")
            .and_then(|s| non_empty(&s))
            .or_else(|| config.completion.api_key.as_deref().and_then(non_empty))
            .filter(|k| k != API_KEY_PLACEHOLDER);

        let completion = api_key.map(|api_key| CompletionSettings {
            api_key,
            base_url: env("OPENAI_BASE_URL")
                .and_then(|s| non_empty(&s))
                .or_else(|| config.completion.base_url.as_deref().and_then(non_empty))
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            model: env("OPENAI_MODEL")
                .and_then(|s| non_empty(&s))
                .or_else(|| config.completion.model.as_deref().and_then(non_empty))
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            max_tokens: config.completion.max_tokens,
            temperature: config.completion.temperature,
        });

        Self {
            bind: config.server.bind.trim().to_string(),
            port,
            base_url,
            documents_dir,
            completion,
        }
    }

    pub fn endpoint_urls(&self) -> EndpointUrls {
        let base = &self.base_url;
        EndpointUrls {
            base_url: base.clone(),
            messaging: format!("{}/api/messages", base),
            card: format!("{}/api/card", base),
            manifest: format!("{}/api/manifest", base),
            declarative: format!("{}/api/declarative-agent", base),
            discovery: format!("{}/api/discovery", base),
            well_known_card: format!("{}/.well-known/agent-card.json", base),
            well_known_discovery: format!("{}/.well-known/agent-discovery.json", base),
            icon: format!("{}/icon.png", base),
        }
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("DADJOKE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".dadjoke").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, DADJOKE_CONFIG_PATH, or the default. Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let rc = RuntimeConfig::resolve_with(&Config::default(), env_of(&[]));
        assert_eq!(rc.port, 2009);
        assert_eq!(rc.bind, "0.0.0.0");
        assert_eq!(rc.base_url, "http://localhost:2009");
        assert_eq!(rc.documents_dir, PathBuf::from("."));
        assert!(rc.completion.is_none());
    }

    #[test]
    fn port_env_feeds_default_base_url() {
        let rc = RuntimeConfig::resolve_with(&Config::default(), env_of(&[("PORT", "8080")]));
        assert_eq!(rc.port, 8080);
        assert_eq!(rc.base_url, "http://localhost:8080");
    }

    #[test]
    fn invalid_port_env_keeps_config_port() {
        let rc = RuntimeConfig::resolve_with(&Config::default(), env_of(&[("PORT", "nope")]));
        assert_eq!(rc.port, 2009);
    }

    #[test]
    fn base_url_env_overrides_file() {
        let mut config = Config::default();
        config.server.base_url = Some("https://file.example".to_string());
        let rc = RuntimeConfig::resolve_with(
            &config,
            env_of(&[("BASE_URL", "https://tunnel.example/")]),
        );
        assert_eq!(rc.base_url, "https://tunnel.example");
    }

    #[test]
    fn placeholder_key_disables_completion() {
        let rc = RuntimeConfig::resolve_with(
            &Config::default(),
            env_of(&[("OPENAI_API_KEY", API_KEY_PLACEHOLDER)]),
        );
        assert!(rc.completion.is_none());

        let rc = RuntimeConfig::resolve_with(&Config::default(), env_of(&[("OPENAI_API_KEY", "  ")]));
        assert!(rc.completion.is_none());
    }

    #[test]
    fn key_enables_completion_with_defaults() {
        let rc = RuntimeConfig::resolve_with(
            &Config::default(),
            env_of(&[("OPENAI_API_KEY", "sk-test")]),
        );
        let c = rc.completion.expect("completion settings");
        assert_eq!(c.api_key, "sk-test");
        assert_eq!(c.base_url, "https://api.openai.com/v1");
        assert_eq!(c.model, "gpt-3.5-turbo");
        assert_eq!(c.max_tokens, 150);
        assert!((c.temperature - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_camel_case_file() {
        let config: Config = serde_json::from_str(
            r#"{"server":{"port":3000,"baseUrl":"https://x.example","documentsDir":"docs"},
                "completion":{"apiKey":"sk-file","maxTokens":60}}"#,
        )
        .unwrap();
        let rc = RuntimeConfig::resolve_with(&config, env_of(&[]));
        assert_eq!(rc.port, 3000);
        assert_eq!(rc.base_url, "https://x.example");
        assert_eq!(rc.documents_dir, PathBuf::from("docs"));
        let c = rc.completion.unwrap();
        assert_eq!(c.api_key, "sk-file");
        assert_eq!(c.max_tokens, 60);
    }

    #[test]
    fn endpoint_urls_use_base_url() {
        let rc = RuntimeConfig::resolve_with(
            &Config::default(),
            env_of(&[("BASE_URL", "https://bot.example")]),
        );
        let urls = rc.endpoint_urls();
        assert_eq!(urls.messaging, "https://bot.example/api/messages");
        assert_eq!(
            urls.well_known_card,
            "https://bot.example/.well-known/agent-card.json"
        );
        assert_eq!(urls.icon, "https://bot.example/icon.png");
    }

    #[test]
    fn load_config_missing_file_is_default() {
        let path = std::env::temp_dir().join("dadjoke-config-does-not-exist.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.server.port, 2009);
    }
}
