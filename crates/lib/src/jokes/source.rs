//! `get_joke`: catalog joke for generic requests, generated joke for topics.

use crate::config::RuntimeConfig;
use crate::jokes::catalog::JokeCatalog;
use crate::jokes::classifier::is_generic_request;
use crate::llm::{CompletionError, OpenAiClient};
use async_trait::async_trait;
use std::sync::Arc;

/// Prefix on every joke the agent sends.
pub const JOKE_MARKER: &str = "🤣";

/// Appended to the fallback joke when generation failed.
pub const GENERATION_FAILED_NOTICE: &str =
    "_(Had trouble with a custom joke, so here's a classic!)_";

/// Appended to catalog jokes for topic requests when no API key is configured.
pub const MISSING_KEY_NOTICE: &str = "_(For custom jokes, add your OpenAI API key to .env!)_";

const SYSTEM_INSTRUCTION: &str = "You are a dad joke expert. Generate a single, clean, family-friendly dad joke. Only return the joke itself, no explanations or additional text.";

/// Generates one joke about a topic. Implemented by the completion client; tests substitute doubles.
#[async_trait]
pub trait JokeGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<String, CompletionError>;
}

#[async_trait]
impl JokeGenerator for OpenAiClient {
    async fn generate(&self, topic: &str) -> Result<String, CompletionError> {
        let user = format!("Tell me a dad joke about: {}", topic);
        self.complete(SYSTEM_INSTRUCTION, &user).await
    }
}

/// Joke provider shared (read-only) by all requests.
#[derive(Clone)]
pub struct JokeSource {
    catalog: JokeCatalog,
    generator: Option<Arc<dyn JokeGenerator>>,
}

impl JokeSource {
    pub fn new(catalog: JokeCatalog, generator: Option<Arc<dyn JokeGenerator>>) -> Self {
        Self { catalog, generator }
    }

    /// Built-in catalog plus the completion client when a credential is configured.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let generator = config.completion.as_ref().map(|settings| {
            log::debug!("joke generation via {} ({})", settings.base_url, settings.model);
            Arc::new(OpenAiClient::new(settings)) as Arc<dyn JokeGenerator>
        });
        Self::new(JokeCatalog::default(), generator)
    }

    pub fn catalog(&self) -> &JokeCatalog {
        &self.catalog
    }

    pub fn generation_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Never fails: every error path degrades to a catalog joke with a notice.
    pub async fn get_joke(&self, topic: &str) -> String {
        let topic = topic.trim();
        if is_generic_request(topic) {
            return self.classic();
        }
        let Some(generator) = self.generator.as_ref() else {
            return format!("{}\n\n{}", self.classic(), MISSING_KEY_NOTICE);
        };
        match generator.generate(topic).await {
            Ok(joke) => format!("{} {}", JOKE_MARKER, joke.trim()),
            Err(e) => {
                log::warn!("error generating joke about {:?}: {}", topic, e);
                format!("{}\n\n{}", self.classic(), GENERATION_FAILED_NOTICE)
            }
        }
    }

    fn classic(&self) -> String {
        format!("{} {}", JOKE_MARKER, self.catalog.random())
    }
}
