//! Activity router: dispatch by kind to message, conversation-update, event and invoke
//! handlers. Stateless; one dispatch per inbound message.

use crate::activity::context::TurnContext;
use crate::activity::model::{ActivityKind, InboundMessage};
use crate::jokes::JokeSource;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Event name that starts an agent-to-agent handoff.
pub const HANDOFF_EVENT: &str = "handoff";

/// Invoke name of the standard agent-to-agent handoff.
pub const HANDOFF_INVOKE: &str = "application/vnd.microsoft.activity.handoff";

/// Handoff payload fields that may carry the user's request, in priority order.
const HANDOFF_REQUEST_FIELDS: [&str; 4] = ["request", "message", "userMessage", "text"];

const INVOKE_ACK: &str = "Invoke received by Dad Joke Agent";

pub const WELCOME_TEXT: &str = "👋 Welcome to the Dad Joke Agent!

I'm here to brighten your day with the finest dad jokes around! Just ask me for a joke, or specify a topic you'd like a joke about.

Type `/help` for more information. Let's get this party started! 🎉";

pub const HELP_TEXT: &str = "🤣 **Dad Joke Agent** 🤣

I'm your friendly Dad Joke delivery service! Here's what I can do:

**Commands:**
- Just say hi or ask for a joke to get a random dad joke
- Ask for a joke about a specific topic (e.g., \"tell me a joke about cats\")
- Type `/help` to see this message

**Examples:**
- \"Tell me a dad joke\"
- \"Give me a joke about food\"
- \"Make me laugh\"
- \"Random joke please\"

Ready to groan? Ask away! 😄";

pub const HANDOFF_ACK: &str = "🤝 **Handoff Received!**

Hey there! I'm the Dad Joke Agent, and I've just received your conversation from another agent.

I'm here to make you laugh with some quality dad jokes! What kind of joke would you like to hear?";

pub const HANDOFF_APOLOGY: &str =
    "I received the handoff, but encountered an issue. Let's start fresh - ask me for a joke!";

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("activity is missing {0}")]
    MissingField(&'static str),
    #[error("handoff request must be a string, got {0}")]
    InvalidHandoffRequest(&'static str),
    #[error("encoding invoke response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// `{ "status", "body" }` value of an invokeResponse activity.
#[derive(Debug, Serialize)]
struct InvokeResponse<B> {
    status: u16,
    body: B,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeAck<'a> {
    message: &'a str,
    invoke_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct InvokeFailure {
    error: String,
}

/// Dispatches inbound messages. Holds only read-only shared state.
#[derive(Clone)]
pub struct ActivityRouter {
    jokes: Arc<JokeSource>,
}

impl ActivityRouter {
    pub fn new(jokes: Arc<JokeSource>) -> Self {
        Self { jokes }
    }

    /// Handle one inbound message, appending responses to `ctx`. Unknown kinds produce nothing.
    /// Only malformed conversation updates return an error; invoke and handoff failures are
    /// turned into in-band responses.
    pub async fn dispatch(
        &self,
        msg: &InboundMessage,
        ctx: &mut TurnContext,
    ) -> Result<(), RouterError> {
        match &msg.kind {
            ActivityKind::Message => {
                log::debug!("routing to message handler");
                self.on_message(msg, ctx).await;
            }
            ActivityKind::ConversationUpdate => {
                log::debug!("routing to conversation update handler");
                self.on_conversation_update(msg, ctx)?;
            }
            ActivityKind::Event => {
                log::debug!("routing to event handler");
                self.on_event(msg, ctx).await;
            }
            ActivityKind::Invoke => {
                log::debug!("routing to invoke handler");
                self.on_invoke(msg, ctx).await;
            }
            ActivityKind::Other(typ) => {
                log::warn!("unknown activity type: {}", typ);
            }
        }
        Ok(())
    }

    /// Welcome every added member except the bot itself.
    fn on_conversation_update(
        &self,
        msg: &InboundMessage,
        ctx: &mut TurnContext,
    ) -> Result<(), RouterError> {
        if msg.members_added.is_empty() {
            return Ok(());
        }
        let bot_id = msg
            .recipient_id
            .as_deref()
            .ok_or(RouterError::MissingField("recipient"))?;
        for member in msg.members_added.iter().filter(|m| m.as_str() != bot_id) {
            log::debug!("welcoming member {}", member);
            ctx.send_text(WELCOME_TEXT);
        }
        Ok(())
    }

    async fn on_message(&self, msg: &InboundMessage, ctx: &mut TurnContext) {
        let text = msg.text.as_deref().unwrap_or("").trim();
        if text.eq_ignore_ascii_case("/help") || text.eq_ignore_ascii_case("help") {
            ctx.send_text(HELP_TEXT);
            return;
        }
        let joke = self.jokes.get_joke(text).await;
        ctx.send_text(joke);
    }

    async fn on_event(&self, msg: &InboundMessage, ctx: &mut TurnContext) {
        match msg.name.as_deref() {
            Some(HANDOFF_EVENT) => self.handoff(msg, ctx).await,
            Some(name) => ctx.send_text(format!("Received event: {}", name)),
            None => ctx.send_text("Received event: (none)"),
        }
    }

    async fn on_invoke(&self, msg: &InboundMessage, ctx: &mut TurnContext) {
        if let Err(e) = self.try_invoke(msg, ctx).await {
            log::warn!("error handling invoke: {}", e);
            let failure = InvokeResponse {
                status: 500,
                body: InvokeFailure {
                    error: e.to_string(),
                },
            };
            let payload = serde_json::to_value(&failure)
                .unwrap_or_else(|_| serde_json::json!({ "status": 500 }));
            ctx.send_invoke_response(payload);
        }
    }

    async fn try_invoke(
        &self,
        msg: &InboundMessage,
        ctx: &mut TurnContext,
    ) -> Result<(), RouterError> {
        log::info!(
            "invoke received: name={:?} value={}",
            msg.name,
            msg.value.as_ref().map(Value::to_string).unwrap_or_default()
        );
        if msg.name.as_deref() == Some(HANDOFF_INVOKE) {
            self.handoff(msg, ctx).await;
            return Ok(());
        }
        let ack = InvokeResponse {
            status: 200,
            body: InvokeAck {
                message: INVOKE_ACK,
                invoke_name: msg.name.as_deref(),
            },
        };
        ctx.send_invoke_response(serde_json::to_value(&ack)?);
        Ok(())
    }

    /// Acknowledge the handoff, then answer the carried request if there is one.
    async fn handoff(&self, msg: &InboundMessage, ctx: &mut TurnContext) {
        log::info!("handoff received via {:?}", msg.kind);
        if let Some(ref value) = msg.value {
            log::debug!("handoff context: {}", value);
        }
        ctx.send_text(HANDOFF_ACK);
        if let Err(e) = self.answer_handoff_request(msg, ctx).await {
            log::warn!("error handling handoff: {}", e);
            ctx.send_text(HANDOFF_APOLOGY);
        }
    }

    async fn answer_handoff_request(
        &self,
        msg: &InboundMessage,
        ctx: &mut TurnContext,
    ) -> Result<(), RouterError> {
        if let Some(request) = handoff_request(msg.value.as_ref())? {
            let joke = self.jokes.get_joke(request).await;
            ctx.send_text(joke);
        }
        Ok(())
    }
}

/// First truthy request field of an object payload. A truthy non-string is an error.
fn handoff_request(value: Option<&Value>) -> Result<Option<&str>, RouterError> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return Ok(None);
    };
    let found = HANDOFF_REQUEST_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .find(|v| is_truthy(v));
    match found {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(RouterError::InvalidHandoffRequest(json_type_name(other))),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::OutboundResponse;
    use crate::jokes::{JokeCatalog, JokeGenerator, JOKE_MARKER};
    use crate::llm::CompletionError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the topic so tests can see what reached the joke source.
    #[derive(Default)]
    struct EchoGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JokeGenerator for EchoGenerator {
        async fn generate(&self, topic: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("joke about {}", topic))
        }
    }

    fn router() -> (ActivityRouter, Arc<EchoGenerator>) {
        let gen = Arc::new(EchoGenerator::default());
        let source = JokeSource::new(
            JokeCatalog::default(),
            Some(gen.clone() as Arc<dyn JokeGenerator>),
        );
        (ActivityRouter::new(Arc::new(source)), gen)
    }

    async fn run(router: &ActivityRouter, msg: InboundMessage) -> Vec<OutboundResponse> {
        let mut ctx = TurnContext::new();
        router.dispatch(&msg, &mut ctx).await.expect("dispatch");
        ctx.into_responses()
    }

    fn texts(responses: &[OutboundResponse]) -> Vec<&str> {
        responses.iter().filter_map(|r| r.text()).collect()
    }

    fn invoke(name: Option<&str>, value: Option<Value>) -> InboundMessage {
        InboundMessage {
            name: name.map(str::to_string),
            value,
            ..InboundMessage::new(ActivityKind::Invoke)
        }
    }

    #[tokio::test]
    async fn help_in_any_case_skips_joke_lookup() {
        let (router, gen) = router();
        for text in ["/help", "/HELP", "  Help  "] {
            let out = run(&router, InboundMessage::message(text)).await;
            assert_eq!(texts(&out), vec![HELP_TEXT]);
        }
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn message_text_is_trimmed_before_joke_lookup() {
        let (router, _) = router();
        let out = run(&router, InboundMessage::message("  cats  ")).await;
        assert_eq!(texts(&out), vec!["🤣 joke about cats"]);
    }

    #[tokio::test]
    async fn message_without_text_gets_catalog_joke() {
        let (router, gen) = router();
        let out = run(&router, InboundMessage::new(ActivityKind::Message)).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].text().unwrap().starts_with(JOKE_MARKER));
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conversation_update_skips_the_bot() {
        let (router, _) = router();
        let msg = InboundMessage {
            members_added: vec!["bot".to_string(), "user-1".to_string()],
            recipient_id: Some("bot".to_string()),
            ..InboundMessage::new(ActivityKind::ConversationUpdate)
        };
        let out = run(&router, msg).await;
        assert_eq!(texts(&out), vec![WELCOME_TEXT]);
    }

    #[tokio::test]
    async fn conversation_update_without_recipient_is_an_error() {
        let (router, _) = router();
        let msg = InboundMessage {
            members_added: vec!["user-1".to_string()],
            ..InboundMessage::new(ActivityKind::ConversationUpdate)
        };
        let mut ctx = TurnContext::new();
        let err = router.dispatch(&msg, &mut ctx).await.unwrap_err();
        assert!(matches!(err, RouterError::MissingField("recipient")));
    }

    #[tokio::test]
    async fn non_handoff_event_is_echoed() {
        let (router, _) = router();
        let msg = InboundMessage {
            name: Some("ping".to_string()),
            ..InboundMessage::new(ActivityKind::Event)
        };
        assert_eq!(texts(&run(&router, msg).await), vec!["Received event: ping"]);
        let out = run(&router, InboundMessage::new(ActivityKind::Event)).await;
        assert_eq!(texts(&out), vec!["Received event: (none)"]);
    }

    #[tokio::test]
    async fn handoff_event_acknowledges_and_answers_request() {
        let (router, _) = router();
        let msg = InboundMessage {
            name: Some(HANDOFF_EVENT.to_string()),
            value: Some(json!({ "message": "", "userMessage": "pizza", "text": "ignored" })),
            ..InboundMessage::new(ActivityKind::Event)
        };
        let out = run(&router, msg).await;
        assert_eq!(texts(&out), vec![HANDOFF_ACK, "🤣 joke about pizza"]);
    }

    #[tokio::test]
    async fn handoff_without_request_only_acknowledges() {
        let (router, _) = router();
        for value in [None, Some(json!("just a string")), Some(json!({ "other": 1 }))] {
            let out = run(&router, invoke(Some(HANDOFF_INVOKE), value)).await;
            assert_eq!(texts(&out), vec![HANDOFF_ACK]);
        }
    }

    #[tokio::test]
    async fn handoff_with_non_string_request_apologizes() {
        let (router, _) = router();
        let out = run(&router, invoke(Some(HANDOFF_INVOKE), Some(json!({ "request": 42 })))).await;
        assert_eq!(texts(&out), vec![HANDOFF_ACK, HANDOFF_APOLOGY]);
    }

    #[tokio::test]
    async fn unknown_invoke_is_acknowledged() {
        let (router, _) = router();
        let out = run(&router, invoke(Some("custom/skill"), Some(json!({})))).await;
        assert_eq!(
            out,
            vec![OutboundResponse::InvokeResponse {
                payload: json!({
                    "status": 200,
                    "body": {
                        "message": "Invoke received by Dad Joke Agent",
                        "invokeName": "custom/skill"
                    }
                })
            }]
        );
    }

    #[tokio::test]
    async fn unknown_kind_produces_nothing() {
        let (router, _) = router();
        let out = run(&router, InboundMessage::new(ActivityKind::from_wire("typing"))).await;
        assert!(out.is_empty());
    }

    #[test]
    fn truthiness_follows_json_values() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1.5)));
    }
}
