//! Push Registration Pipeline
//!
//! Turns reminders on for a user in four sequential steps:
//!
//! 1. permission: abort the whole flow unless granted
//! 2. worker registration: failure is logged, later steps continue
//! 3. subscription + server registration: skipped without a worker, failures
//!    swallowed
//! 4. reminder setup on the backend: always attempted once permission is
//!    granted; its outcome decides what the user is told
//!
//! Each step records a [`StepOutcome`] in the [`RegistrationReport`].

use base64ct::{Base64UrlUnpadded, Encoding};

use super::platform::{PlatformError, PushPlatform};
use crate::config::PushSettings;
use crate::domain::UserId;
use crate::gateway::{BackendGateway, GatewayError, ReminderSetup};
use crate::messages::PlannerMessage;

/// What happened to one step of the pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed
    Success,
    /// Step did not run
    Skipped {
        /// Why it did not run
        reason: String,
    },
    /// Step ran and failed
    Failed {
        /// What went wrong
        reason: String,
    },
}

impl StepOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }

    /// Whether the step completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of every step of one registration attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Permission prompt
    pub permission: StepOutcome,
    /// Worker installation
    pub worker: StepOutcome,
    /// Push service subscription
    pub subscription: StepOutcome,
    /// Handing the subscription to the backend
    pub server_registration: StepOutcome,
    /// Backend reminder setup; `None` when permission was not granted
    pub reminder_setup: Option<Result<ReminderSetup, GatewayError>>,
}

impl RegistrationReport {
    fn denied() -> Self {
        let skipped = || StepOutcome::skipped("notification permission not granted");
        Self {
            permission: StepOutcome::failed("notification permission not granted"),
            worker: skipped(),
            subscription: skipped(),
            server_registration: skipped(),
            reminder_setup: None,
        }
    }

    /// Reminder count to record, when setup succeeded
    #[must_use]
    pub fn total_reminders(&self) -> Option<u32> {
        match &self.reminder_setup {
            Some(Ok(setup)) => Some(setup.total_reminders),
            _ => None,
        }
    }

    /// What to tell the user
    #[must_use]
    pub fn notification(&self) -> PlannerMessage {
        match &self.reminder_setup {
            None => PlannerMessage::error("Please allow notifications to receive reminders"),
            Some(Ok(setup)) => PlannerMessage::success(format!(
                "Smart reminders enabled! {} reminders set up with push notifications.",
                setup.total_reminders
            )),
            Some(Err(_)) => PlannerMessage::error("Failed to setup reminders. Please try again."),
        }
    }
}

/// Decode a URL-safe base64 application server key
///
/// Trailing `=` padding is tolerated.
///
/// # Errors
///
/// [`PlatformError::InvalidKey`] for anything that is not URL-safe base64.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>, PlatformError> {
    Base64UrlUnpadded::decode_vec(key.trim().trim_end_matches('='))
        .map_err(|e| PlatformError::InvalidKey(e.to_string()))
}

/// Runs the registration pipeline
#[derive(Clone, Debug)]
pub struct PushRegistrar {
    settings: PushSettings,
}

impl PushRegistrar {
    /// Create a registrar with the configured worker path and key
    #[must_use]
    pub fn new(settings: PushSettings) -> Self {
        Self { settings }
    }

    /// Run every step for `user`
    pub async fn run<G>(
        &self,
        gateway: &G,
        platform: &dyn PushPlatform,
        user: UserId,
    ) -> RegistrationReport
    where
        G: BackendGateway + ?Sized,
    {
        let permission = platform.request_permission().await;
        if !permission.is_granted() {
            tracing::info!(?permission, "Notification permission not granted");
            return RegistrationReport::denied();
        }

        let (worker, subscription, server_registration) =
            self.register_push(gateway, platform, user).await;

        let reminder_setup = gateway.request_reminder_setup(user).await;
        match &reminder_setup {
            Ok(setup) => tracing::info!(
                total = setup.total_reminders,
                meal = setup.meal_reminders,
                water = setup.water_reminders,
                doctor = setup.doctor_reminders,
                "Reminders set up"
            ),
            Err(e) => tracing::warn!(error = %e, "Reminder setup failed"),
        }

        RegistrationReport {
            permission: StepOutcome::Success,
            worker,
            subscription,
            server_registration,
            reminder_setup: Some(reminder_setup),
        }
    }

    async fn register_push<G>(
        &self,
        gateway: &G,
        platform: &dyn PushPlatform,
        user: UserId,
    ) -> (StepOutcome, StepOutcome, StepOutcome)
    where
        G: BackendGateway + ?Sized,
    {
        let registration = match platform.register_worker(&self.settings.worker_path).await {
            Ok(registration) => {
                tracing::info!(scope = %registration.scope, "Push worker registered");
                registration
            }
            Err(e) => {
                tracing::warn!(error = %e, "Push worker registration failed");
                return (
                    StepOutcome::failed(e),
                    StepOutcome::skipped("no worker registration"),
                    StepOutcome::skipped("no worker registration"),
                );
            }
        };

        let subscription = match decode_application_server_key(
            &self.settings.application_server_key,
        ) {
            Ok(key) => platform.subscribe(&registration, &key).await,
            Err(e) => Err(e),
        };
        let subscription = match subscription {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(error = %e, "Push subscription failed");
                return (
                    StepOutcome::Success,
                    StepOutcome::failed(e),
                    StepOutcome::skipped("no push subscription"),
                );
            }
        };

        let server_registration = match gateway.register_push_subscription(user, &subscription).await
        {
            Ok(_) => StepOutcome::Success,
            Err(e) => {
                tracing::warn!(error = %e, "Backend rejected push subscription");
                StepOutcome::failed(e)
            }
        };

        (StepOutcome::Success, StepOutcome::Success, server_registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_APPLICATION_SERVER_KEY;

    #[test]
    fn test_default_key_decodes_to_uncompressed_point() {
        let key = decode_application_server_key(DEFAULT_APPLICATION_SERVER_KEY).unwrap();
        // Uncompressed P-256 public key
        assert_eq!(key.len(), 65);
        assert_eq!(key[0], 0x04);
    }

    #[test]
    fn test_padded_key_is_accepted() {
        assert_eq!(decode_application_server_key("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_application_server_key("AQI=").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_standard_alphabet_key_is_rejected() {
        let err = decode_application_server_key("ab+/").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidKey(_)));
    }

    #[test]
    fn test_denied_report_skips_everything() {
        let report = RegistrationReport::denied();
        assert!(!report.permission.is_success());
        assert!(matches!(report.worker, StepOutcome::Skipped { .. }));
        assert!(report.reminder_setup.is_none());
        assert_eq!(
            report.notification(),
            PlannerMessage::error("Please allow notifications to receive reminders")
        );
    }
}
