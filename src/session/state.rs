//! Session state machine.

/// Lifecycle state of a per-key session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Session is accumulating messages.
    #[default]
    Active,
    /// Collection window has fired; the session is leaving the registry
    /// and tearing down its inbox.
    Closing,
    /// Session loop has ended and cannot be reused.
    Closed,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Active -> Closing
    /// - Closing -> Closed
    /// - Active -> Closed (cancelled)
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Active, Closing) | (Closing, Closed) | (Active, Closed)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::DedupeError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    /// Check if the session still appends inbound messages.
    pub fn accepts_messages(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_path() {
        let mut state = SessionState::Active;
        assert!(state.transition_to(SessionState::Closing).is_ok());
        assert_eq!(state, SessionState::Closing);

        assert!(state.transition_to(SessionState::Closed).is_ok());
        assert_eq!(state, SessionState::Closed);
    }

    #[test]
    fn test_cancel_path() {
        let mut state = SessionState::Active;
        assert!(state.transition_to(SessionState::Closed).is_ok());
        assert!(state.is_terminal());
    }

    #[test]
    fn test_no_reentry_to_active() {
        let mut state = SessionState::Closing;
        assert!(state.transition_to(SessionState::Active).is_err());
        assert_eq!(state, SessionState::Closing);

        let mut state = SessionState::Closed;
        assert!(state.transition_to(SessionState::Active).is_err());
        assert!(state.transition_to(SessionState::Closing).is_err());
        assert_eq!(state, SessionState::Closed);
    }

    #[test]
    fn test_accepts_messages() {
        assert!(SessionState::Active.accepts_messages());
        assert!(!SessionState::Closing.accepts_messages());
        assert!(!SessionState::Closed.accepts_messages());
    }

    #[test]
    fn test_default() {
        assert_eq!(SessionState::default(), SessionState::Active);
    }
}
