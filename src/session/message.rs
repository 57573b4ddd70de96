//! Inbound message type.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// A timestamped, key-bearing message.
///
/// Messages with equal keys are grouped into the same session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Grouping key.
    pub key: String,
    /// Time the message was observed.
    pub timestamp: SystemTime,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(key: impl Into<String>) -> Self {
        Self::at(key, SystemTime::now())
    }

    /// Create a message with an explicit timestamp.
    pub fn at(key: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            key: key.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_is_stamped_now() {
        let before = SystemTime::now();
        let msg = Message::new("a");
        let after = SystemTime::now();

        assert_eq!(msg.key, "a");
        assert!(msg.timestamp >= before && msg.timestamp <= after);
    }

    #[test]
    fn test_at_keeps_timestamp() {
        let ts = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let msg = Message::at(String::from("sensor-7"), ts);
        assert_eq!(msg.timestamp, ts);
        assert_eq!(msg.key, "sensor-7");
    }

    #[test]
    fn test_serializes_key() {
        let msg = Message::at("a", SystemTime::UNIX_EPOCH);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"key\":\"a\""));
        assert!(json.contains("\"timestamp\""));
    }
}
