//! Per-request response accumulator.

use crate::activity::model::OutboundResponse;

/// Collects responses for one inbound message. Handlers take it by `&mut`; the transport
/// reads it back once dispatch returns.
#[derive(Debug, Default)]
pub struct TurnContext {
    responses: Vec<OutboundResponse>,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.responses.push(OutboundResponse::Message { text: text.into() });
    }

    pub fn send_invoke_response(&mut self, payload: serde_json::Value) {
        self.responses.push(OutboundResponse::InvokeResponse { payload });
    }

    pub fn responses(&self) -> &[OutboundResponse] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<OutboundResponse> {
        self.responses
    }
}
