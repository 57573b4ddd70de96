//! Session registry: at most one live session per key.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::inbox::{Delivery, Inbox};
use super::worker::SessionWorker;
use super::Message;
use crate::config::WindowConfig;
use crate::error::DedupeError;
use crate::Result;

/// Window callback, invoked with the session key and its messages.
///
/// Callbacks run on detached tasks; their completion is never awaited.
pub type Callback = Arc<dyn Fn(String, Vec<Message>) + Send + Sync + 'static>;

/// Anything that accepts uplink messages.
pub trait UplinkHandler: Send + Sync {
    /// Hand a message over for windowing.
    fn handle_uplink(&self, msg: Message);
}

/// State shared between the registry handle and its session loops.
pub(crate) struct Shared {
    sessions: DashMap<String, Arc<Inbox>>,
    config: WindowConfig,
    pub(crate) on_dedupe: Callback,
    pub(crate) on_collect: Callback,
    shutdown: watch::Sender<bool>,
    runtime: Handle,
}

impl Shared {
    pub(crate) fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub(crate) fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Drop the key's entry. Only called by the key's own session at
    /// collection-window expiry.
    pub(crate) fn remove(&self, key: &str) {
        self.sessions.remove(key);
    }

    /// Hand a message to its key's session, starting one if needed.
    pub(crate) fn submit(self: &Arc<Self>, msg: Message) {
        if self.is_shut_down() {
            debug!(key = %msg.key, "registry shut down; message dropped");
            return;
        }

        let inbox = self.session_for(&msg.key);
        self.deliver(inbox, msg);
    }

    /// Send through an inbox obtained earlier. If that session has been
    /// torn down in the meantime, the message moves on to the key's
    /// current session.
    fn deliver(self: &Arc<Self>, inbox: Arc<Inbox>, msg: Message) {
        let mut inbox = inbox;
        let mut msg = msg;
        loop {
            match inbox.send(msg) {
                Delivery::Delivered => return,
                Delivery::Closed(returned) => {
                    if self.is_shut_down() {
                        debug!(key = %returned.key, "registry shut down; message dropped");
                        return;
                    }
                    trace!(key = %returned.key, "session closed during hand-off; resubmitting");
                    inbox = self.session_for(&returned.key);
                    msg = returned;
                }
                Delivery::Abandoned => {
                    debug!("session loop gone; message dropped");
                    return;
                }
            }
        }
    }

    /// Find the key's inbox, atomically starting a session when there is
    /// none (or only a torn-down one).
    fn session_for(self: &Arc<Self>, key: &str) -> Arc<Inbox> {
        match self.sessions.entry(key.to_string()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => Arc::clone(entry.get()),
            Entry::Occupied(mut entry) => {
                let inbox = self.start_session(key);
                entry.insert(Arc::clone(&inbox));
                inbox
            }
            Entry::Vacant(entry) => {
                let inbox = self.start_session(key);
                entry.insert(Arc::clone(&inbox));
                inbox
            }
        }
    }

    fn start_session(self: &Arc<Self>, key: &str) -> Arc<Inbox> {
        let (inbox, rx) = Inbox::new();
        let worker = SessionWorker::new(
            key.to_string(),
            Arc::clone(&inbox),
            rx,
            Instant::now(),
            Arc::clone(self),
        );
        self.runtime.spawn(worker.run());
        inbox
    }
}

/// Per-key deduplication and collection windows.
///
/// The first message for a key starts a session that reports a snapshot
/// after the dedupe window and the full batch after the collection window,
/// then retires the key. Both windows are measured from the first message.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use uplink_dedupe::{Deduplicator, Message, WindowConfig};
///
/// #[tokio::main]
/// async fn main() -> uplink_dedupe::Result<()> {
///     let dedup = Deduplicator::new(
///         WindowConfig::default(),
///         Arc::new(|key, msgs| println!("{key}: deduped {}", msgs.len())),
///         Arc::new(|key, msgs| println!("{key}: collected {}", msgs.len())),
///     )?;
///
///     dedup.submit(Message::new("a"));
///     Ok(())
/// }
/// ```
pub struct Deduplicator {
    shared: Arc<Shared>,
}

impl Deduplicator {
    /// Create a registry bound to the current Tokio runtime.
    ///
    /// Session loops and callbacks are spawned onto that runtime, so
    /// [`submit`](Self::submit) may be called from any thread.
    pub fn new(config: WindowConfig, on_dedupe: Callback, on_collect: Callback) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| DedupeError::NoRuntime)?;
        let config = WindowConfig::new(config.dedupe, config.collect)?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            shared: Arc::new(Shared {
                sessions: DashMap::new(),
                config,
                on_dedupe,
                on_collect,
                shutdown,
                runtime,
            }),
        })
    }

    /// Submit a message to its key's session, starting one if needed.
    ///
    /// Never fails. If the session found for the key has just been torn
    /// down, the message is resubmitted and lands in a fresh session.
    pub fn submit(&self, msg: Message) {
        self.shared.submit(msg);
    }

    /// Signal every session loop to stop.
    ///
    /// Best-effort: pending sessions end without reporting, and later
    /// submissions are dropped.
    pub fn shutdown(&self) {
        debug!(sessions = self.active_sessions(), "shutting down registry");
        self.shared.shutdown.send_replace(true);
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shared.is_shut_down()
    }

    /// Check if a session is currently registered for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.shared.sessions.contains_key(key)
    }

    /// Number of registered sessions.
    pub fn active_sessions(&self) -> usize {
        self.shared.sessions.len()
    }

    /// Window configuration in use.
    pub fn config(&self) -> &WindowConfig {
        self.shared.config()
    }
}

impl UplinkHandler for Deduplicator {
    fn handle_uplink(&self, msg: Message) {
        self.submit(msg);
    }
}

impl std::fmt::Debug for Deduplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deduplicator")
            .field("config", self.config())
            .field("active_sessions", &self.active_sessions())
            .finish()
    }
}
