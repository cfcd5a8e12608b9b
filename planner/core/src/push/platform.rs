//! Push Platform Traits
//!
//! The host capabilities the registration flow needs: asking for
//! notification permission, installing the worker, and subscribing to a push
//! service. A browser, a desktop shell, or a terminal each provide their own.

use async_trait::async_trait;
use thiserror::Error;

use crate::gateway::PushSubscription;

/// Result of asking the user for notification permission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// Notifications allowed
    Granted,
    /// Notifications refused
    Denied,
    /// The user dismissed the prompt
    Dismissed,
}

impl Permission {
    /// Only an explicit grant counts
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Host-side push failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The host has no push service
    #[error("push messaging is not supported here")]
    Unsupported,

    /// Worker could not be installed
    #[error("worker registration failed: {0}")]
    Registration(String),

    /// Push service refused the subscription
    #[error("push subscription failed: {0}")]
    Subscription(String),

    /// Application server key is not URL-safe base64
    #[error("invalid application server key: {0}")]
    InvalidKey(String),
}

/// A worker installed by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerRegistration {
    /// Script path the worker was registered from
    pub script_path: String,
    /// Scope the worker controls
    pub scope: String,
}

/// Host push capabilities
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Ask the user to allow notifications
    async fn request_permission(&self) -> Permission;

    /// Install the push worker from `script_path`
    async fn register_worker(&self, script_path: &str)
        -> Result<WorkerRegistration, PlatformError>;

    /// Subscribe the worker to the push service
    async fn subscribe(
        &self,
        registration: &WorkerRegistration,
        application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError>;

    /// Show a notification straight from the app, bypassing the push service
    ///
    /// Hosts without local notifications can keep the default no-op.
    async fn show_local(&self, title: &str, body: &str) -> Result<(), PlatformError> {
        let _ = (title, body);
        Ok(())
    }
}
