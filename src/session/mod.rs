//! Per-key session management.
//!
//! This module provides the message type, the session state machine, the
//! race-safe session inbox and the registry that guarantees at most one
//! live session per key.

mod inbox;
mod message;
mod registry;
mod state;
mod worker;

pub use message::Message;
pub use registry::{Callback, Deduplicator, UplinkHandler};
pub use state::SessionState;
