//! Shaman Relay HTTP Server
//!
//! Forwards one chat-completion request per call to the model provider,
//! injecting the credential and identification headers, and hands the
//! provider's answer back unchanged.

pub mod relay;
pub mod server;

pub use relay::{ApiError, Relay, relay_handler};
pub use server::{GatewayState, build_router, start_server};
