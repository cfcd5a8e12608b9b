//! Display State Types
//!
//! What the TUI remembers between frames that the controller does not:
//! the toast currently shown, the question awaiting an answer, and the
//! farewell printed after the terminal is restored.
//!
//! # Design Philosophy
//!
//! The TUI is a thin client. Everything about the planner itself is read
//! straight off [`planner_core::AppState`]; display state only holds what
//! arrived as a [`PlannerMessage`] and would otherwise be lost.

use std::time::Duration;

use planner_core::{NotifyLevel, PlannerMessage, Screen, Session};

/// A toast shown on the status line
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayNotification {
    /// Severity
    pub level: NotifyLevel,
    /// Text
    pub message: String,
    /// How long it has been shown
    pub shown_for: Duration,
}

impl DisplayNotification {
    /// A fresh toast
    pub fn new(level: NotifyLevel, message: String) -> Self {
        Self {
            level,
            message,
            shown_for: Duration::ZERO,
        }
    }

    /// Icon in front of the text
    pub fn icon(&self) -> &'static str {
        match self.level {
            NotifyLevel::Success => "[+]",
            NotifyLevel::Error => "[!]",
            NotifyLevel::Info => "[i]",
        }
    }
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Screen last announced by the controller
    pub screen: Screen,
    /// Session last announced by the controller
    pub session: Option<Session>,
    /// Toast currently shown
    pub notification: Option<DisplayNotification>,
    /// Question waiting for y/n
    pub prompt: Option<String>,
    /// Farewell from the controller
    pub goodbye: Option<String>,
    /// The controller asked the surface to exit
    pub quit_requested: bool,
    notification_timeout: Duration,
}

impl DisplayState {
    /// Create display state whose toasts last `notification_timeout`
    pub fn new(notification_timeout: Duration) -> Self {
        Self {
            screen: Screen::Home,
            session: None,
            notification: None,
            prompt: None,
            goodbye: None,
            quit_requested: false,
            notification_timeout,
        }
    }

    /// Apply a PlannerMessage to update display state
    pub fn apply_message(&mut self, msg: PlannerMessage) {
        match msg {
            PlannerMessage::ScreenChanged { screen } => {
                self.screen = screen;
                self.prompt = None;
            }
            PlannerMessage::SessionChanged { session } => {
                self.session = session;
            }
            PlannerMessage::Notify { level, message } => {
                // A newer toast replaces the old one and restarts the timer
                self.notification = Some(DisplayNotification::new(level, message));
            }
            PlannerMessage::ConfirmRequested { prompt } => {
                self.prompt = Some(prompt);
            }
            PlannerMessage::Quit { message } => {
                self.goodbye = message;
                self.quit_requested = true;
            }
        }
    }

    /// Advance timers, dismissing the toast once it has been up long enough
    pub fn update(&mut self, delta: Duration) {
        if let Some(notification) = self.notification.as_mut() {
            notification.shown_for += delta;
            if notification.shown_for >= self.notification_timeout {
                self.notification = None;
            }
        }
    }

    /// Forget the pending question once answered
    pub fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    /// Dismiss the toast early
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Name shown in the header
    pub fn user_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }
}
