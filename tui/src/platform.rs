//! Terminal Push Platform
//!
//! A terminal has no push service and no notification centre. The platform
//! here grants permission outright, installs the in-process push worker, and
//! reports that it cannot subscribe, so enabling reminders still sets them
//! up on the backend. Whatever the worker shows lands in a
//! [`NotificationPanel`] the reminders screen draws.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use planner_core::gateway::PushSubscription;
use planner_core::push::WorkerRegistration;
use planner_core::worker::{Notification, PushPayload};
use planner_core::{
    Permission, PlatformError, PushPlatform, ServiceWorker, WorkerEvent, WorkerHandle, WorkerHost,
    WorkerState,
};

/// Lines of worker activity kept for display
const ACTIVITY_LIMIT: usize = 20;

// ============================================================================
// Notification Panel
// ============================================================================

#[derive(Debug, Default)]
struct PanelInner {
    shown: Vec<Notification>,
    activity: Vec<String>,
}

/// Notifications on screen, plus a short log of what the worker did
#[derive(Clone, Debug, Default)]
pub struct NotificationPanel {
    inner: Arc<Mutex<PanelInner>>,
}

impl NotificationPanel {
    /// Empty panel
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PanelInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show a notification, replacing any with the same tag
    pub fn show(&self, notification: Notification) {
        let mut inner = self.lock();
        inner.shown.retain(|n| n.tag != notification.tag);
        inner.shown.push(notification);
    }

    /// Remove the notification with `tag`
    pub fn close(&self, tag: &str) {
        self.lock().shown.retain(|n| n.tag != tag);
    }

    /// Notifications on screen, oldest first
    pub fn shown(&self) -> Vec<Notification> {
        self.lock().shown.clone()
    }

    /// Most recent notification
    pub fn latest(&self) -> Option<Notification> {
        self.lock().shown.last().cloned()
    }

    /// Append a line of worker activity
    pub fn record(&self, line: impl Into<String>) {
        let mut inner = self.lock();
        inner.activity.push(line.into());
        let excess = inner.activity.len().saturating_sub(ACTIVITY_LIMIT);
        inner.activity.drain(..excess);
    }

    /// Worker activity, oldest first
    pub fn activity(&self) -> Vec<String> {
        self.lock().activity.clone()
    }
}

// ============================================================================
// Worker Host
// ============================================================================

/// Where the push worker's visible effects go in a terminal
pub struct TerminalHost {
    panel: NotificationPanel,
}

impl TerminalHost {
    /// Host drawing into `panel`
    pub fn new(panel: NotificationPanel) -> Self {
        Self { panel }
    }
}

#[async_trait]
impl WorkerHost for TerminalHost {
    async fn skip_waiting(&self) -> anyhow::Result<()> {
        tracing::debug!("Worker skipped waiting");
        Ok(())
    }

    async fn claim_clients(&self) -> anyhow::Result<()> {
        self.panel.record("Reminder worker active");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> anyhow::Result<()> {
        self.panel.show(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> anyhow::Result<()> {
        self.panel.close(&notification.tag);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> anyhow::Result<()> {
        tracing::info!(%url, "Worker opened the planner");
        self.panel.record(format!("Opened {url}"));
        Ok(())
    }
}

// ============================================================================
// Push Platform
// ============================================================================

/// Push capabilities of a terminal session
pub struct TerminalPlatform {
    worker: WorkerHandle,
    panel: NotificationPanel,
    scope: String,
}

impl TerminalPlatform {
    /// Start the push worker for `scope` on its own task
    pub fn spawn(scope: impl Into<String>) -> (Self, JoinHandle<()>) {
        let scope = scope.into();
        let panel = NotificationPanel::new();
        let worker = ServiceWorker::new(TerminalHost::new(panel.clone()), scope.clone());
        let (worker, join) = WorkerHandle::spawn(worker);

        (
            Self {
                worker,
                panel,
                scope,
            },
            join,
        )
    }

    /// Handle to the running worker
    pub fn worker(&self) -> &WorkerHandle {
        &self.worker
    }

    /// Notifications the worker has shown
    pub fn panel(&self) -> &NotificationPanel {
        &self.panel
    }
}

#[async_trait]
impl PushPlatform for TerminalPlatform {
    async fn request_permission(&self) -> Permission {
        // Nothing to ask: the panel is part of the app
        Permission::Granted
    }

    async fn register_worker(
        &self,
        script_path: &str,
    ) -> Result<WorkerRegistration, PlatformError> {
        let registration_failed = |e: planner_core::worker::WorkerError| {
            PlatformError::Registration(e.to_string())
        };

        if self.worker.state() == WorkerState::Parsed {
            self.worker
                .dispatch(WorkerEvent::Install)
                .map_err(registration_failed)?;
            self.worker
                .dispatch(WorkerEvent::Activate)
                .map_err(registration_failed)?;
        }
        self.worker
            .wait_for(WorkerState::Activated)
            .await
            .map_err(registration_failed)?;

        Ok(WorkerRegistration {
            script_path: script_path.to_string(),
            scope: self.scope.clone(),
        })
    }

    async fn subscribe(
        &self,
        _registration: &WorkerRegistration,
        _application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError> {
        Err(PlatformError::Unsupported)
    }

    async fn show_local(&self, title: &str, body: &str) -> Result<(), PlatformError> {
        self.panel.show(Notification::from_payload(PushPayload {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            ..PushPayload::default()
        }));
        Ok(())
    }
}
