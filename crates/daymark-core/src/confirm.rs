//! The one confirmation dialog reused by every destructive action.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmKind {
    /// Irreversible removal (items, themes, running timers).
    Danger,
    /// Informational; there is nothing to confirm, only to acknowledge.
    Warning,
    /// Check-in or cancel a check-in.
    Checkin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    pub kind: ConfirmKind,
}

impl Confirmation {
    pub fn danger(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: ConfirmKind::Danger,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: ConfirmKind::Warning,
        }
    }

    pub fn checkin(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: ConfirmKind::Checkin,
        }
    }

    /// Shown when a view switch would abandon a running clock.
    pub fn running_timer() -> Self {
        Self::danger(
            "Timer is Running",
            "Are you sure you want to switch? The current timer progress will be lost.",
        )
    }
}
