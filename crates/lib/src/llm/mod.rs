//! Completion-service client used to generate topic jokes.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint; one non-streaming request per call.

mod openai;

pub use openai::{CompletionError, OpenAiClient};
