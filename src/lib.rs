//! # uplink-dedupe
//!
//! Per-key deduplication and collection windows over a stream of
//! timestamped messages.
//!
//! The first message for a key opens a session. After the dedupe window the
//! session reports a snapshot of what it has seen so far; after the longer
//! collection window it reports everything it accumulated and retires the
//! key, so the next message for that key opens a fresh session. Both
//! windows are fixed from the first message and do not slide.
//!
//! ## Features
//!
//! - **One session per key**: atomic get-or-insert on a concurrent map
//! - **Race-safe teardown**: late messages land in a new session, never in
//!   a half-closed one
//! - **Async callbacks**: reports run on detached tokio tasks
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use uplink_dedupe::{Deduplicator, Message, WindowConfig};
//!
//! #[tokio::main]
//! async fn main() -> uplink_dedupe::Result<()> {
//!     uplink_dedupe::logging::try_init().ok();
//!
//!     let dedup = Deduplicator::new(
//!         WindowConfig::default(),
//!         Arc::new(|key, msgs| println!("{key}: deduped {}", msgs.len())),
//!         Arc::new(|key, msgs| println!("{key}: collected {}", msgs.len())),
//!     )?;
//!
//!     dedup.submit(Message::new("a"));
//!     dedup.submit(Message::new("a"));
//!
//!     tokio::time::sleep(dedup.config().collect).await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use config::WindowConfig;
pub use error::{DedupeError, Result};
pub use session::{Callback, Deduplicator, Message, SessionState, UplinkHandler};
