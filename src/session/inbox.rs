//! Race-safe inbound queue for a session.
//!
//! Producers hold the shared lock for the duration of a send; teardown takes
//! the exclusive lock, so it only proceeds once no producer is mid-send. A
//! producer that finds the queue closed gets its message back and must
//! resubmit it through the registry.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::trace;

use super::Message;

/// Outcome of handing a message to an [`Inbox`].
#[derive(Debug)]
pub(crate) enum Delivery {
    /// The message is queued for the session loop.
    Delivered,
    /// The inbox was torn down; the message is handed back untouched.
    Closed(Message),
    /// The session loop is gone without a teardown (shutdown). The message
    /// was dropped.
    Abandoned,
}

/// Unbounded message queue guarded by a shared/exclusive lock.
#[derive(Debug)]
pub(crate) struct Inbox {
    tx: RwLock<Option<mpsc::UnboundedSender<Message>>>,
}

impl Inbox {
    /// Create an open inbox and the receiving end for the session loop.
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inbox = Arc::new(Self {
            tx: RwLock::new(Some(tx)),
        });
        (inbox, rx)
    }

    /// Hand a message to the session.
    pub(crate) fn send(&self, msg: Message) -> Delivery {
        // A poisoned lock only means another producer panicked mid-send; the
        // sender slot itself is still consistent.
        let guard = self.tx.read().unwrap_or_else(|e| e.into_inner());

        match guard.as_ref() {
            None => Delivery::Closed(msg),
            Some(tx) => match tx.send(msg) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Abandoned,
            },
        }
    }

    /// Tear down the inbox.
    ///
    /// Waits for in-flight sends, discards everything still queued and marks
    /// the inbox permanently closed. Returns the number of discarded messages.
    pub(crate) fn close(&self, rx: &mut mpsc::UnboundedReceiver<Message>) -> usize {
        let mut guard = self.tx.write().unwrap_or_else(|e| e.into_inner());

        let mut drained = 0;
        while let Ok(msg) = rx.try_recv() {
            trace!(key = %msg.key, "draining message");
            drained += 1;
        }

        *guard = None;
        rx.close();
        drained
    }

    /// Check whether teardown has completed.
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.read().map(|tx| tx.is_none()).unwrap_or(true)
    }
}
