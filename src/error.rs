//! Error types for uplink-dedupe.

use std::time::Duration;

use thiserror::Error;

/// Main error type for uplink-dedupe operations.
#[derive(Error, Debug)]
pub enum DedupeError {
    /// The dedupe window does not end before the collection window.
    #[error("dedupe window ({dedupe:?}) must be shorter than collection window ({collect:?})")]
    InvalidWindows { dedupe: Duration, collect: Duration },

    /// A window was configured with a zero duration.
    #[error("window duration must be non-zero")]
    ZeroWindow,

    /// No Tokio runtime was available when the registry was created.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },
}

/// Convenience Result type for uplink-dedupe operations.
pub type Result<T> = std::result::Result<T, DedupeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    #[test]
    fn test_invalid_windows_display() {
        let err = DedupeError::InvalidWindows {
            dedupe: Duration::from_secs(5),
            collect: Duration::from_secs(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("5s"));
        assert!(msg.contains("2s"));
        assert!(msg.contains("shorter"));
    }

    #[test]
    fn test_state_transition_display() {
        let err = DedupeError::InvalidStateTransition {
            from: SessionState::Closed,
            to: SessionState::Active,
        };
        assert!(err.to_string().contains("Closed"));
        assert!(err.to_string().contains("Active"));
    }

    #[test]
    fn test_zero_window_display() {
        assert!(DedupeError::ZeroWindow.to_string().contains("non-zero"));
    }

    #[test]
    fn test_no_runtime_display() {
        assert!(DedupeError::NoRuntime.to_string().contains("runtime"));
    }
}
