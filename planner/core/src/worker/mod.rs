//! Push Service Worker
//!
//! The background side of reminders: installs, activates, turns pushes into
//! notifications and reacts to clicks on them.
//!
//! # Design Philosophy
//!
//! The worker has its own lifecycle, independent of any screen or session.
//! [`WorkerHandle::spawn`] runs it as a separate tokio task fed by a channel,
//! so the controller can come and go while the worker keeps serving events.
//! Everything with a visible effect (showing a notification, opening the
//! app) goes through the [`WorkerHost`] trait.
//!
//! # Lifecycle
//!
//! ```text
//! Parsed ──install──▶ Installing ──▶ Installed ──activate──▶ Activating ──▶ Activated
//! ```
//!
//! Push and click events are only served once `Activated`.

mod notification;

pub use notification::{
    Notification, NotificationAction, PushPayload, DEFAULT_BODY, DEFAULT_ICON, DEFAULT_TITLE,
    REMINDER_TAG,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Worker lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Script loaded, nothing run yet
    Parsed,
    /// Install handler running
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activate handler running
    Activating,
    /// Serving events
    Activated,
}

/// Events delivered to the worker
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    /// First-time setup
    Install,
    /// Take over clients
    Activate,
    /// A push arrived
    Push {
        /// Raw payload bytes, if any
        data: Option<Vec<u8>>,
    },
    /// The user clicked a notification or one of its buttons
    NotificationClick {
        /// The clicked notification
        notification: Notification,
        /// Button identifier, `None` for the body
        action: Option<String>,
    },
    /// The user dismissed a notification
    NotificationClose {
        /// The dismissed notification
        notification: Notification,
    },
}

impl WorkerEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Push { .. } => "push",
            Self::NotificationClick { .. } => "notificationclick",
            Self::NotificationClose { .. } => "notificationclose",
        }
    }
}

/// Worker failures
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Event does not fit the current lifecycle state
    #[error("cannot handle {event} while {state:?}")]
    InvalidState {
        /// Event name
        event: &'static str,
        /// State at the time
        state: WorkerState,
    },

    /// The worker task has stopped
    #[error("worker is not running")]
    Stopped,

    /// A host call failed
    #[error("host error: {0}")]
    Host(#[from] anyhow::Error),
}

/// Host capabilities the worker drives
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate without waiting for old clients to close
    async fn skip_waiting(&self) -> anyhow::Result<()>;

    /// Take control of every open client
    async fn claim_clients(&self) -> anyhow::Result<()>;

    /// Show a notification
    async fn show_notification(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Close a shown notification
    async fn close_notification(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Open the app at `url`
    async fn open_window(&self, url: &str) -> anyhow::Result<()>;
}

/// What a click resolved to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Opened the app at this URL
    Opened(String),
    /// Snoozed; nothing rescheduled
    Snoozed,
}

/// The push worker
pub struct ServiceWorker<H: WorkerHost> {
    host: H,
    scope: String,
    state: WorkerState,
}

impl<H: WorkerHost> ServiceWorker<H> {
    /// Create a parsed worker serving `scope` (e.g. `/diet-planner/`)
    pub fn new(host: H, scope: impl Into<String>) -> Self {
        Self {
            host,
            scope: scope.into(),
            state: WorkerState::Parsed,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Host the worker drives
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Handle one event
    ///
    /// # Errors
    ///
    /// [`WorkerError::InvalidState`] for an event the lifecycle does not
    /// allow yet, [`WorkerError::Host`] if the host call failed.
    pub async fn handle(&mut self, event: WorkerEvent) -> Result<Option<ClickOutcome>, WorkerError> {
        tracing::debug!(event = event.name(), state = ?self.state, "Worker event");

        match event {
            WorkerEvent::Install => {
                self.require(WorkerState::Parsed, "install")?;
                tracing::info!("Push worker installing");
                self.state = WorkerState::Installing;
                self.host.skip_waiting().await?;
                self.state = WorkerState::Installed;
                Ok(None)
            }
            WorkerEvent::Activate => {
                self.require(WorkerState::Installed, "activate")?;
                tracing::info!("Push worker activating");
                self.state = WorkerState::Activating;
                self.host.claim_clients().await?;
                self.state = WorkerState::Activated;
                Ok(None)
            }
            WorkerEvent::Push { data } => {
                self.require(WorkerState::Activated, "push")?;
                let notification =
                    Notification::from_payload(PushPayload::from_bytes(data.as_deref()));
                tracing::info!(title = %notification.title, "Push received");
                self.host.show_notification(&notification).await?;
                Ok(None)
            }
            WorkerEvent::NotificationClick {
                notification,
                action,
            } => {
                self.require(WorkerState::Activated, "notificationclick")?;
                tracing::info!(action = action.as_deref().unwrap_or("default"), "Notification clicked");
                self.host.close_notification(&notification).await?;
                self.click(&notification, action.as_deref()).await.map(Some)
            }
            WorkerEvent::NotificationClose { notification } => {
                tracing::info!(tag = %notification.tag, "Notification closed");
                Ok(None)
            }
        }
    }

    async fn click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> Result<ClickOutcome, WorkerError> {
        match action.and_then(NotificationAction::parse) {
            Some(NotificationAction::MarkConsumed) => {
                let url = format!(
                    "{}?action=mark-consumed&meal={}",
                    self.scope,
                    notification.meal_type().unwrap_or("breakfast")
                );
                self.host.open_window(&url).await?;
                Ok(ClickOutcome::Opened(url))
            }
            Some(NotificationAction::Snooze) => {
                tracing::info!("Snoozed for 15 minutes");
                Ok(ClickOutcome::Snoozed)
            }
            None => {
                self.host.open_window(&self.scope).await?;
                Ok(ClickOutcome::Opened(self.scope.clone()))
            }
        }
    }

    fn require(&self, expected: WorkerState, event: &'static str) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            tracing::warn!(event, state = ?self.state, "Worker event out of order");
            Err(WorkerError::InvalidState {
                event,
                state: self.state,
            })
        }
    }
}

/// Handle to a worker running on its own task
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::UnboundedSender<WorkerEvent>,
    state: watch::Receiver<WorkerState>,
}

impl WorkerHandle {
    /// Move the worker onto a new task
    ///
    /// The task runs until every handle is dropped.
    pub fn spawn<H>(mut worker: ServiceWorker<H>) -> (Self, JoinHandle<()>)
    where
        H: WorkerHost + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkerEvent>();
        let (state_tx, state_rx) = watch::channel(worker.state());

        let join = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = worker.handle(event).await {
                    tracing::warn!(error = %e, "Worker event failed");
                }
                state_tx.send_replace(worker.state());
            }
            tracing::debug!("Push worker stopped");
        });

        (
            Self {
                tx,
                state: state_rx,
            },
            join,
        )
    }

    /// Queue an event
    ///
    /// # Errors
    ///
    /// [`WorkerError::Stopped`] if the worker task has ended.
    pub fn dispatch(&self, event: WorkerEvent) -> Result<(), WorkerError> {
        self.tx.send(event).map_err(|_| WorkerError::Stopped)
    }

    /// Last observed lifecycle state
    #[must_use]
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Wait until the worker reaches `target`
    ///
    /// # Errors
    ///
    /// [`WorkerError::Stopped`] if the worker task ends first.
    pub async fn wait_for(&self, target: WorkerState) -> Result<(), WorkerError> {
        let mut state = self.state.clone();
        state
            .wait_for(|s| *s == target)
            .await
            .map(|_| ())
            .map_err(|_| WorkerError::Stopped)
    }
}
