//! Authoritative multiplayer flight simulator core.
//!
//! The server side owns rooms, sessions, and message routing; the
//! `sim` and `client` modules are shared with clients embedding the
//! flight model and reconciliation logic directly.

pub mod app;
pub mod client;
pub mod config;
pub mod http;
pub mod lobby;
pub mod sim;
pub mod util;
pub mod ws;
