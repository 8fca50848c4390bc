//! Wire formats accepted on the message endpoint: bot-framework activities and JSON-RPC 2.0
//! `message/send`. Each has its own parser and serializer; both meet at
//! [`InboundMessage`] / [`OutboundResponse`].

use crate::activity::{ActivityKind, InboundMessage, OutboundResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";
pub const MESSAGE_SEND_METHOD: &str = "message/send";

/// Inbound body, classified by shape (not by headers).
#[derive(Debug, Clone)]
pub enum InboundEnvelope {
    JsonRpc(JsonRpcRequest),
    Activity(Activity),
}

impl InboundEnvelope {
    /// JSON-RPC when `jsonrpc == "2.0"` and `method == "message/send"`; any other body must be
    /// an activity (with at least a `type`).
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        if is_message_send(&value) {
            Ok(Self::JsonRpc(serde_json::from_value(value)?))
        } else {
            Ok(Self::Activity(serde_json::from_value(value)?))
        }
    }
}

fn is_message_send(value: &Value) -> bool {
    value.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && value.get("method").and_then(Value::as_str) == Some(MESSAGE_SEND_METHOD)
}

// --- Bot-framework activity ---

/// Channel account (`from`, `recipient`, `membersAdded[]`). Unknown fields are kept so replies
/// echo them back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationAccount {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound activity (subset of fields the agent reads).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<ChannelAccount>,
    #[serde(default)]
    pub recipient: Option<ChannelAccount>,
    #[serde(default)]
    pub conversation: Option<ConversationAccount>,
    #[serde(default)]
    pub service_url: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub members_added: Option<Vec<ChannelAccount>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl Activity {
    pub fn to_inbound(&self) -> InboundMessage {
        InboundMessage {
            kind: ActivityKind::from_wire(&self.typ),
            text: self.text.clone(),
            members_added: self
                .members_added
                .iter()
                .flatten()
                .map(|m| m.id.clone())
                .collect(),
            recipient_id: self.recipient.as_ref().map(|r| r.id.clone()),
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }

    /// Reply activity for one response: addressed back to the sender, threaded on this activity.
    pub fn reply(&self, response: OutboundResponse) -> OutboundActivity {
        let (typ, text, value) = match response {
            OutboundResponse::Message { text } => ("message", text, None),
            OutboundResponse::InvokeResponse { payload } => {
                ("invokeResponse", String::new(), Some(payload))
            }
        };
        OutboundActivity {
            typ: typ.to_string(),
            text,
            value,
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            reply_to_id: self.id.clone(),
            service_url: self.service_url.clone(),
            channel_id: self.channel_id.clone(),
            conversation: self.conversation.clone(),
        }
    }
}

/// Outbound activity as returned in the HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundActivity {
    #[serde(rename = "type")]
    pub typ: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub from: Option<ChannelAccount>,
    pub recipient: Option<ChannelAccount>,
    pub reply_to_id: Option<String>,
    pub service_url: Option<String>,
    pub channel_id: Option<String>,
    pub conversation: Option<ConversationAccount>,
}

/// `{ "activities": [...] }` body used when a turn produced more than one response.
#[derive(Debug, Serialize)]
pub struct ActivityBatch {
    pub activities: Vec<OutboundActivity>,
}

// --- JSON-RPC 2.0 message/send ---

/// `message/send` request. `id` may be any JSON value and is echoed back (null when absent).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Text of the first `kind == "text"` part of `params.message.parts`, or "".
    pub fn message_text(&self) -> &str {
        self.params
            .get("message")
            .and_then(|m| m.get("parts"))
            .and_then(Value::as_array)
            .and_then(|parts| {
                parts
                    .iter()
                    .find(|p| p.get("kind").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|p| p.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    pub result: MessageSendResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageSendResult {
    pub message: A2aMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct A2aMessage {
    pub kind: &'static str,
    pub parts: Vec<A2aPart>,
    pub role: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct A2aPart {
    pub kind: &'static str,
    pub text: String,
}

impl JsonRpcResponse {
    /// Success envelope carrying one assistant text message.
    pub fn assistant_text(id: Value, text: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: MessageSendResult {
                message: A2aMessage {
                    kind: "message",
                    parts: vec![A2aPart {
                        kind: "text",
                        text: text.into(),
                    }],
                    role: "assistant",
                },
            },
        }
    }
}

/// Outbound body, in the flavor of the inbound request.
#[derive(Debug)]
pub enum OutboundEnvelope {
    JsonRpc(JsonRpcResponse),
    Single(OutboundActivity),
    Batch(ActivityBatch),
    Empty,
}

impl OutboundEnvelope {
    /// One response => the activity itself; several => `{activities}`; none => no body.
    pub fn from_responses(activity: &Activity, responses: Vec<OutboundResponse>) -> Self {
        let mut activities: Vec<OutboundActivity> =
            responses.into_iter().map(|r| activity.reply(r)).collect();
        match activities.len() {
            0 => Self::Empty,
            1 => Self::Single(activities.remove(0)),
            _ => Self::Batch(ActivityBatch { activities }),
        }
    }
}
