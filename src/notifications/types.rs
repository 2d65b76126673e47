//! Notification type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    Comment, // Someone commented on your experience
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Comment => "comment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }
}
