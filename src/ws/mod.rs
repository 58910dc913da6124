//! Realtime WebSocket layer: wire protocol, intent router, and the
//! axum connection handler

pub mod handler;
pub mod protocol;
pub mod router;

pub use protocol::{ClientMsg, PlayerPatch, ServerMsg};
pub use router::{ConnectionSession, MessageRouter};
