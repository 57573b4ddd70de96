//! Per-session event loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

use super::inbox::Inbox;
use super::registry::Shared;
use super::{Message, SessionState};

/// Event loop owning the state of one key's session.
///
/// All mutation of the accumulated sequence happens on this loop, so the
/// sequence itself needs no lock.
pub(crate) struct SessionWorker {
    key: String,
    state: SessionState,
    messages: Vec<Message>,
    inbox: Arc<Inbox>,
    rx: mpsc::UnboundedReceiver<Message>,
    dedupe_at: Instant,
    collect_at: Instant,
    shared: Arc<Shared>,
    shutdown: watch::Receiver<bool>,
}

impl SessionWorker {
    /// Create the loop for a session created at `created`.
    ///
    /// Both windows are measured from `created` and never move.
    pub(crate) fn new(
        key: String,
        inbox: Arc<Inbox>,
        rx: mpsc::UnboundedReceiver<Message>,
        created: Instant,
        shared: Arc<Shared>,
    ) -> Self {
        let config = *shared.config();
        let shutdown = shared.subscribe_shutdown();
        Self {
            key,
            state: SessionState::Active,
            messages: Vec::new(),
            inbox,
            rx,
            dedupe_at: created + config.dedupe,
            collect_at: created + config.collect,
            shared,
            shutdown,
        }
    }

    /// Drive the session until its collection window fires or shutdown is
    /// signalled.
    pub(crate) async fn run(mut self) {
        debug!(key = %self.key, "session started");

        let dedupe = time::sleep_until(self.dedupe_at);
        let collect = time::sleep_until(self.collect_at);
        tokio::pin!(dedupe);
        tokio::pin!(collect);
        let mut deduped = false;

        while !self.state.is_terminal() {
            // Queued messages are folded in before an idle timer is polled;
            // under sustained input the deadlines are checked per message
            // instead, so a busy inbox cannot hold a window open.
            tokio::select! {
                biased;

                _ = shutdown_signalled(&mut self.shutdown) => {
                    self.cancel();
                }
                Some(msg) = self.rx.recv() => {
                    let now = Instant::now();
                    if !deduped && now >= self.dedupe_at {
                        deduped = true;
                        self.report_dedupe();
                    }
                    if now >= self.collect_at {
                        self.collect();
                    }
                    self.accept(msg);
                }
                _ = &mut dedupe, if !deduped => {
                    deduped = true;
                    self.report_dedupe();
                }
                _ = &mut collect => {
                    self.collect();
                }
            }
        }
    }

    fn accept(&mut self, msg: Message) {
        if self.state.accepts_messages() {
            trace!(key = %self.key, "message accumulated");
            self.messages.push(msg);
        } else {
            // Arrived after the collection window; belongs to the key's
            // next session.
            trace!(key = %self.key, "late message; resubmitting");
            self.shared.submit(msg);
        }
    }

    fn report_dedupe(&self) {
        debug!(key = %self.key, count = self.messages.len(), "dedupe window closed");

        let handler = Arc::clone(&self.shared.on_dedupe);
        let key = self.key.clone();
        let snapshot = self.messages.clone();
        tokio::spawn(async move { handler(key, snapshot) });
    }

    fn collect(&mut self) {
        self.transition(SessionState::Closing);

        // Leave the registry first so new messages for this key start a
        // fresh session instead of racing the teardown below.
        self.shared.remove(&self.key);

        debug!(key = %self.key, count = self.messages.len(), "collection window closed");
        let handler = Arc::clone(&self.shared.on_collect);
        let key = self.key.clone();
        let messages = std::mem::take(&mut self.messages);
        tokio::spawn(async move { handler(key, messages) });

        let drained = self.inbox.close(&mut self.rx);
        if drained > 0 {
            debug!(key = %self.key, drained, "discarded messages queued during teardown");
        }

        self.transition(SessionState::Closed);
        debug!(key = %self.key, "session closed");
    }

    fn cancel(&mut self) {
        debug!(
            key = %self.key,
            pending = self.messages.len(),
            "session cancelled by shutdown"
        );
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, target: SessionState) {
        if let Err(e) = self.state.transition_to(target) {
            warn!(key = %self.key, error = %e, "unexpected session transition");
        }
    }
}

/// Resolves once shutdown has been signalled, including before this call.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    // An error means the registry is gone; treat that as shutdown too.
    let _ = rx.wait_for(|stop| *stop).await;
}
