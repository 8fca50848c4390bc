//! Gateway: the agent's HTTP surface.
//!
//! One port serves the health check, the static integration documents, and the message
//! endpoint that accepts both bot-framework activities and JSON-RPC 2.0 `message/send`.

mod documents;
mod protocol;
mod server;

pub use documents::{apply_base_url, load_document, DocumentError, StaticDocument};
pub use protocol::{
    Activity, ActivityBatch, ChannelAccount, ConversationAccount, InboundEnvelope,
    JsonRpcRequest, JsonRpcResponse, OutboundActivity, OutboundEnvelope,
};
pub use server::{app, handle_message, run_gateway, GatewayState, MessageError};
