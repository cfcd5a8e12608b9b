//! Planner Messages
//!
//! Messages sent from the controller to the UI surface.
//!
//! # Design Philosophy
//!
//! The controller owns all state and decides what happens; the surface is a
//! renderer. Messages tell the surface about things it cannot read off
//! [`crate::AppState`] alone: transient notifications, screen changes it may
//! want to animate, and requests it must answer (confirmation, quit).

use serde::{Deserialize, Serialize};

use crate::domain::Session;
use crate::screen::Screen;

/// Messages from controller to UI surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlannerMessage {
    // ============================================
    // Navigation
    // ============================================
    /// The current screen changed
    ScreenChanged {
        /// Screen now shown
        screen: Screen,
    },

    /// A session started or ended
    SessionChanged {
        /// New session, `None` after logout
        session: Option<Session>,
    },

    // ============================================
    // Feedback
    // ============================================
    /// Show a transient notification
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Text
        message: String,
    },

    /// Ask the user a yes/no question; answer with
    /// [`crate::UserAction::ConfirmationAnswered`]
    ConfirmRequested {
        /// Question text
        prompt: String,
    },

    // ============================================
    // Lifecycle
    // ============================================
    /// The controller is shutting down; the surface should exit
    Quit {
        /// Optional farewell
        message: Option<String>,
    },
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    /// Something worked
    Success,
    /// Something failed
    Error,
    /// Progress or guidance
    Info,
}

impl PlannerMessage {
    /// Success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Success,
            message: message.into(),
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }

    /// Informational notification
    pub fn info(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Info,
            message: message.into(),
        }
    }
}
