//! Activity routing: normalized inbound messages, the per-request response context, and the
//! dispatcher that turns one inbound message into zero or more responses.

mod context;
mod model;
mod router;

pub use context::TurnContext;
pub use model::{ActivityKind, InboundMessage, OutboundResponse};
pub use router::{
    ActivityRouter, RouterError, HANDOFF_ACK, HANDOFF_APOLOGY, HANDOFF_EVENT, HANDOFF_INVOKE,
    HELP_TEXT, WELCOME_TEXT,
};
