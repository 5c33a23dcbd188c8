//! Notifications: ephemeral, per-viewer, per-cycle
//!
//! Generated from detected deltas for whichever viewer the cycle ran
//! for. The engine never persists them; the host renders or discards.

use serde::{Deserialize, Serialize};

/// A notification addressed to the current viewer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier
    pub id: String,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// When the notification was generated
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Whether the viewer has seen it
    pub read: bool,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            timestamp: chrono::Utc::now(),
            read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification() {
        let n = Notification::new("Task assigned", "You were assigned 'QA batch 3'");
        assert!(!n.read);
        assert!(!n.id.is_empty());
        assert_eq!(n.title, "Task assigned");
    }
}
