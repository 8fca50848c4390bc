//! Protocol-independent message and response types.

/// Kind of an inbound activity, from its wire `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Message,
    ConversationUpdate,
    Event,
    Invoke,
    /// Any other activity type (typing, endOfConversation, ...); ignored by the router.
    Other(String),
}

impl ActivityKind {
    pub fn from_wire(typ: &str) -> Self {
        match typ {
            "message" => Self::Message,
            "conversationUpdate" => Self::ConversationUpdate,
            "event" => Self::Event,
            "invoke" => Self::Invoke,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One inbound request, normalized. Built per request and dropped when it completes.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub kind: ActivityKind,
    pub text: Option<String>,
    /// Ids of members added by a conversation update.
    pub members_added: Vec<String>,
    /// Id of the recipient, i.e. the bot itself.
    pub recipient_id: Option<String>,
    /// Event or invoke name.
    pub name: Option<String>,
    /// Event or invoke payload.
    pub value: Option<serde_json::Value>,
}

impl InboundMessage {
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            text: None,
            members_added: Vec::new(),
            recipient_id: None,
            name: None,
            value: None,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ActivityKind::Message)
        }
    }
}

/// One response produced while handling an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundResponse {
    Message { text: String },
    InvokeResponse { payload: serde_json::Value },
}

impl OutboundResponse {
    /// Text of a message response; None for invoke responses.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Message { text } => Some(text),
            Self::InvokeResponse { .. } => None,
        }
    }
}
