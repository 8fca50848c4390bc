//! Static integration documents (agent card, discovery, manifest, declarative agent).
//!
//! Read from disk on every request; the card and discovery document get `{BASE_URL}` replaced
//! with the configured base URL.

use serde_json::Value;
use std::path::{Path, PathBuf};

pub const BASE_URL_PLACEHOLDER: &str = "{BASE_URL}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticDocument {
    AgentCard,
    Discovery,
    Manifest,
    DeclarativeAgent,
}

impl StaticDocument {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::AgentCard => "agent-card.json",
            Self::Discovery => "agent-discovery.json",
            Self::Manifest => "agent-manifest.json",
            Self::DeclarativeAgent => "declarative-agent.json",
        }
    }

    /// Used in the `error` field of not-found responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::AgentCard => "Agent card",
            Self::Discovery => "Agent discovery document",
            Self::Manifest => "Agent manifest",
            Self::DeclarativeAgent => "Declarative agent definition",
        }
    }

    /// Only the card and discovery document carry base-URL placeholders.
    pub fn templated(self) -> bool {
        matches!(self, Self::AgentCard | Self::Discovery)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load and parse a document from `dir`, templating it when the document calls for it.
pub async fn load_document(
    dir: &Path,
    doc: StaticDocument,
    base_url: &str,
) -> Result<Value, DocumentError> {
    let path = dir.join(doc.file_name());
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
            path: path.clone(),
            source,
        })?;
    if !doc.templated() {
        return Ok(value);
    }
    apply_base_url(&value, base_url).map_err(|source| DocumentError::Parse { path, source })
}

/// Replace every `{BASE_URL}` in the serialized document and parse it back.
pub fn apply_base_url(value: &Value, base_url: &str) -> Result<Value, serde_json::Error> {
    let text = serde_json::to_string(value)?;
    serde_json::from_str(&text.replace(BASE_URL_PLACEHOLDER, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_every_placeholder() {
        let doc = json!({
            "url": "{BASE_URL}/api/messages",
            "nested": { "icon": "{BASE_URL}/icon.png", "list": ["{BASE_URL}"] }
        });
        let out = apply_base_url(&doc, "https://bot.example").unwrap();
        assert_eq!(
            out,
            json!({
                "url": "https://bot.example/api/messages",
                "nested": { "icon": "https://bot.example/icon.png", "list": ["https://bot.example"] }
            })
        );
    }

    #[test]
    fn only_card_and_discovery_are_templated() {
        assert!(StaticDocument::AgentCard.templated());
        assert!(StaticDocument::Discovery.templated());
        assert!(!StaticDocument::Manifest.templated());
        assert!(!StaticDocument::DeclarativeAgent.templated());
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = std::env::temp_dir().join("dadjoke-documents-missing");
        let err = load_document(&dir, StaticDocument::Manifest, "http://x")
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().contains("agent-manifest.json"));
    }
}
