//! Dad Joke Agent core library: joke source, activity routing, and the HTTP gateway
//! used by the CLI.

pub mod activity;
pub mod config;
pub mod gateway;
pub mod jokes;
pub mod llm;

/// Display name reported by the health check and logs.
pub const AGENT_NAME: &str = "Dad Joke Agent";
