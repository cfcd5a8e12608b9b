//! Backend Gateway Traits
//!
//! Trait definition for the diet planner backend. The controller only talks
//! to a [`BackendGateway`], so it can run against the HTTP client in
//! production and a scripted mock in tests.
//!
//! # Design Philosophy
//!
//! One async method per backend operation, one request each. Every method
//! returns either the parsed payload or a classified [`GatewayError`] whose
//! `Display` is the text a user should see: the backend's own `error` string
//! when it sent one, otherwise the operation's fallback message.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    Ack, CheckRemindersResponse, DoctorReminderRequest, DoctorReminderResponse, LoginRequest,
    LoginResponse, MarkConsumedResponse, PushSubscription, RegisterRequest, RegisterResponse,
    ReminderSetup, TriggerAllResponse,
};
use crate::domain::{
    AvailableFoods, ConsumptionStatus, DayCompletion, HealthDashboard, MealRecord, MealSlot,
    SelectedFoods, UserId, WeeklyDashboard, WeeklyMealPlan, Weekday,
};

/// Backend operations, used for logging and fallback messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /login`
    Login,
    /// `POST /register`
    Register,
    /// `GET /available_foods/{id}`
    ListAvailableFoods,
    /// `POST /generate_weekly_meal_plan`
    GenerateWeeklyPlan,
    /// `POST /save_meal_plan`
    PersistPlan,
    /// `GET /get_saved_meal_plan/{id}`
    LoadSavedPlan,
    /// `POST /mark_consumed_for_date`
    MarkConsumed,
    /// `POST /clear_consumption_status/{id}`
    ClearConsumption,
    /// `GET /get_consumption_status/{id}`
    FetchConsumptionStatus,
    /// `GET /get_day_completion_status/{id}`
    FetchDayCompletion,
    /// `GET /get_weekly_dashboard/{id}`
    FetchWeeklyDashboard,
    /// `GET /health_dashboard/{id}`
    FetchHealthDashboard,
    /// `POST /chat`
    SendChatMessage,
    /// `POST /subscribe_push`
    RegisterPushSubscription,
    /// `POST /setup_reminders`
    RequestReminderSetup,
    /// `POST /test_push/{id}`
    TriggerTestPush,
    /// `POST /trigger_all_reminders/{id}`
    TriggerAllReminders,
    /// `GET /check_reminders/{id}`
    CheckReminders,
    /// `POST /setup_doctor_reminder`
    SetupDoctorReminder,
}

impl Operation {
    /// Message shown when the backend gave no error text of its own
    #[must_use]
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::ListAvailableFoods => "Failed to load foods",
            Self::GenerateWeeklyPlan => "Failed to generate meal plan",
            Self::PersistPlan => "Failed to save meal plan",
            Self::LoadSavedPlan => "Failed to load saved meal plan",
            Self::MarkConsumed => "Failed to mark as consumed",
            Self::ClearConsumption => "Error clearing consumption history. Please try again.",
            Self::FetchConsumptionStatus => "Failed to load consumption status",
            Self::FetchDayCompletion => "Failed to load day completion",
            Self::FetchWeeklyDashboard => "Failed to load weekly dashboard",
            Self::FetchHealthDashboard => "Failed to load dashboard",
            Self::SendChatMessage => "Sorry, I encountered an error. Please try again.",
            Self::RegisterPushSubscription => "Failed to register push subscription",
            Self::RequestReminderSetup => "Failed to setup reminders. Please try again.",
            Self::TriggerTestPush => "Failed to send test notification",
            Self::TriggerAllReminders => "Failed to trigger all reminders. Please try again.",
            Self::CheckReminders => "Failed to check reminders. Please try again.",
            Self::SetupDoctorReminder => "Failed to setup doctor reminder. Please try again.",
        }
    }

    /// Field a 2xx body must carry before it counts as success
    #[must_use]
    pub fn required_field(&self) -> Option<&'static str> {
        match self {
            Self::Login => Some("user_id"),
            Self::Register => Some("message"),
            Self::ListAvailableFoods => Some("foods_by_meal"),
            Self::GenerateWeeklyPlan | Self::LoadSavedPlan => Some("meal_plan"),
            Self::MarkConsumed
            | Self::TriggerTestPush
            | Self::TriggerAllReminders
            | Self::CheckReminders => Some("success"),
            Self::FetchConsumptionStatus => Some("consumption_status"),
            Self::FetchDayCompletion => Some("day_completion"),
            Self::FetchWeeklyDashboard => Some("weekly_dashboard"),
            Self::FetchHealthDashboard => Some("weekly"),
            Self::SendChatMessage => Some("response"),
            Self::RequestReminderSetup => Some("total_reminders"),
            Self::PersistPlan
            | Self::ClearConsumption
            | Self::RegisterPushSubscription
            | Self::SetupDoctorReminder => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::ListAvailableFoods => "list-available-foods",
            Self::GenerateWeeklyPlan => "generate-weekly-plan",
            Self::PersistPlan => "persist-plan",
            Self::LoadSavedPlan => "load-saved-plan",
            Self::MarkConsumed => "mark-consumed",
            Self::ClearConsumption => "clear-consumption",
            Self::FetchConsumptionStatus => "fetch-consumption-status",
            Self::FetchDayCompletion => "fetch-day-completion",
            Self::FetchWeeklyDashboard => "fetch-weekly-dashboard",
            Self::FetchHealthDashboard => "fetch-health-dashboard",
            Self::SendChatMessage => "send-chat-message",
            Self::RegisterPushSubscription => "register-push-subscription",
            Self::RequestReminderSetup => "request-reminder-setup",
            Self::TriggerTestPush => "trigger-test-push",
            Self::TriggerAllReminders => "trigger-all-reminders",
            Self::CheckReminders => "check-reminders",
            Self::SetupDoctorReminder => "setup-doctor-reminder",
        };
        f.write_str(name)
    }
}

/// A classified gateway failure
///
/// `Display` yields the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Non-2xx response
    #[error("{message}")]
    Backend {
        /// Operation that failed
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Backend `error` text, or the fallback message
        message: String,
    },

    /// The request never produced a response (connect, timeout, ...)
    #[error("{}", .operation.fallback_message())]
    Transport {
        /// Operation that failed
        operation: Operation,
        /// Underlying error, for logs
        detail: String,
    },

    /// 2xx response without the field the operation needs
    #[error("{}", .operation.fallback_message())]
    MissingField {
        /// Operation that failed
        operation: Operation,
        /// The absent field
        field: &'static str,
    },

    /// 2xx response whose body did not match the expected shape
    #[error("{}", .operation.fallback_message())]
    Decode {
        /// Operation that failed
        operation: Operation,
        /// Parser error, for logs
        detail: String,
    },
}

impl GatewayError {
    /// Build a backend failure, preferring the backend's own error text
    #[must_use]
    pub fn backend(operation: Operation, status: u16, error_text: Option<String>) -> Self {
        let message = error_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| operation.fallback_message().to_string());
        Self::Backend {
            operation,
            status,
            message,
        }
    }

    /// Operation that failed
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Backend { operation, .. }
            | Self::Transport { operation, .. }
            | Self::MissingField { operation, .. }
            | Self::Decode { operation, .. } => *operation,
        }
    }

    /// HTTP status, for backend failures
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-facing message
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Diet planner backend
///
/// Implement this trait to point the controller at a different backend.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Authenticate; success requires `user_id`
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError>;

    /// Create an account; inspect [`RegisterResponse::succeeded`]
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, GatewayError>;

    /// Candidate foods per slot for the user's health profile
    async fn list_available_foods(&self, user: UserId) -> Result<AvailableFoods, GatewayError>;

    /// Ask the backend to build a week of meals around the selections
    async fn generate_weekly_plan(
        &self,
        user: UserId,
        selected: &SelectedFoods,
    ) -> Result<WeeklyMealPlan, GatewayError>;

    /// Store a generated plan for later sessions
    async fn persist_plan(
        &self,
        user: UserId,
        plan: &WeeklyMealPlan,
        selected: &SelectedFoods,
    ) -> Result<Ack, GatewayError>;

    /// Fetch the stored plan
    async fn load_saved_plan(&self, user: UserId) -> Result<WeeklyMealPlan, GatewayError>;

    /// Toggle consumption of a slot on a date; the backend owns the flip
    async fn mark_consumed(
        &self,
        user: UserId,
        slot: MealSlot,
        date: &str,
        foods: &[MealRecord],
    ) -> Result<MarkConsumedResponse, GatewayError>;

    /// Forget all consumption history
    async fn clear_consumption(&self, user: UserId) -> Result<Ack, GatewayError>;

    /// Per-date consumed flags
    async fn fetch_consumption_status(&self, user: UserId)
        -> Result<ConsumptionStatus, GatewayError>;

    /// Per-date completion records
    async fn fetch_day_completion(&self, user: UserId) -> Result<DayCompletion, GatewayError>;

    /// Weekly consumption aggregate
    async fn fetch_weekly_dashboard(&self, user: UserId)
        -> Result<WeeklyDashboard, GatewayError>;

    /// Health dashboard aggregate
    async fn fetch_health_dashboard(&self, user: UserId)
        -> Result<HealthDashboard, GatewayError>;

    /// Send a chat message with plan context; returns the reply text
    async fn send_chat_message(
        &self,
        user: Option<UserId>,
        message: &str,
        current_day: Weekday,
        plan: Option<&WeeklyMealPlan>,
    ) -> Result<String, GatewayError>;

    /// Hand the backend a push subscription descriptor
    async fn register_push_subscription(
        &self,
        user: UserId,
        subscription: &PushSubscription,
    ) -> Result<Ack, GatewayError>;

    /// Create the user's meal, water and doctor reminders
    async fn request_reminder_setup(&self, user: UserId) -> Result<ReminderSetup, GatewayError>;

    /// Ask the backend to push a test notification
    async fn trigger_test_push(&self, user: UserId) -> Result<Ack, GatewayError>;

    /// Fire every reminder now
    async fn trigger_all_reminders(&self, user: UserId)
        -> Result<TriggerAllResponse, GatewayError>;

    /// Run the reminder check immediately
    async fn check_reminders(&self, user: UserId) -> Result<CheckRemindersResponse, GatewayError>;

    /// Schedule a recurring doctor checkup reminder
    async fn setup_doctor_reminder(
        &self,
        request: &DoctorReminderRequest<'_>,
    ) -> Result<DoctorReminderResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_prefers_backend_text() {
        let err = GatewayError::backend(Operation::Login, 401, Some("Invalid credentials".into()));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_backend_error_falls_back_per_operation() {
        let err = GatewayError::backend(Operation::MarkConsumed, 500, None);
        assert_eq!(err.to_string(), "Failed to mark as consumed");

        let blank = GatewayError::backend(Operation::Login, 400, Some("  ".into()));
        assert_eq!(blank.to_string(), "Login failed");
    }

    #[test]
    fn test_transport_and_missing_field_use_fallback() {
        let err = GatewayError::Transport {
            operation: Operation::GenerateWeeklyPlan,
            detail: "connection refused".into(),
        };
        assert_eq!(err.user_message(), "Failed to generate meal plan");
        assert_eq!(err.status(), None);

        let err = GatewayError::MissingField {
            operation: Operation::Login,
            field: "user_id",
        };
        assert_eq!(err.user_message(), "Login failed");
        assert_eq!(err.operation(), Operation::Login);
    }

    #[test]
    fn test_operation_display_is_kebab_case() {
        assert_eq!(Operation::FetchDayCompletion.to_string(), "fetch-day-completion");
        assert_eq!(Operation::Login.required_field(), Some("user_id"));
        assert_eq!(Operation::PersistPlan.required_field(), None);
    }
}
