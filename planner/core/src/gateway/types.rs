//! Gateway Payloads
//!
//! Request bodies and response envelopes for the backend HTTP surface. Field
//! names match the backend's JSON exactly.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AvailableFoods, CheckupFrequency, ConsumptionStatus, DayCompletion, DietPreference, FoodRecord,
    HealthCondition, MealRecord, MealSlot, SelectedFoods, UserId, WeeklyDashboard, WeeklyMealPlan,
    Weekday,
};

// =============================================================================
// Requests
// =============================================================================

/// `POST /login`
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    /// Name
    pub name: String,
    /// Password
    pub password: String,
}

/// `POST /register`, built from a validated registration form
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisterRequest {
    /// Name
    pub name: String,
    /// Age
    pub age: u32,
    /// Kilograms
    pub weight: f64,
    /// Centimetres
    pub height: f64,
    /// Health profile
    pub health_conditions: HealthCondition,
    /// Diet preference
    pub diet_preference: DietPreference,
    /// Password
    pub password: String,
}

/// `POST /generate_weekly_meal_plan`
#[derive(Clone, Debug, Serialize)]
pub struct GeneratePlanRequest<'a> {
    /// User id
    pub user_id: UserId,
    /// Selected foods
    pub selected_foods: &'a SelectedFoods,
}

/// `POST /save_meal_plan`
#[derive(Clone, Debug, Serialize)]
pub struct SavePlanRequest<'a> {
    /// User id
    pub user_id: UserId,
    /// Meal plan
    pub meal_plan: &'a WeeklyMealPlan,
    /// Selected foods
    pub selected_foods: &'a SelectedFoods,
}

/// `POST /mark_consumed_for_date`
#[derive(Clone, Debug, Serialize)]
pub struct MarkConsumedRequest<'a> {
    /// User id
    pub user_id: UserId,
    /// Meal type
    pub meal_type: MealSlot,
    /// `YYYY-MM-DD`
    pub date: &'a str,
    /// Foods
    pub foods: &'a [MealRecord],
}

/// `POST /chat`
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Absent when chatting without a session
    pub user_id: Option<UserId>,
    /// Message
    pub message: &'a str,
    /// Current day
    pub current_day: Weekday,
    /// Meal plan
    pub meal_plan: Option<&'a WeeklyMealPlan>,
}

/// `POST /subscribe_push`
#[derive(Clone, Debug, Serialize)]
pub struct SubscribePushRequest<'a> {
    /// User id
    pub user_id: UserId,
    /// Subscription
    pub subscription: &'a PushSubscription,
}

/// `POST /setup_reminders`
#[derive(Clone, Debug, Serialize)]
pub struct SetupRemindersRequest {
    /// User id
    pub user_id: UserId,
}

/// `POST /setup_doctor_reminder`
#[derive(Clone, Debug, Serialize)]
pub struct DoctorReminderRequest<'a> {
    /// User id
    pub user_id: UserId,
    /// Doctor type
    pub doctor_type: &'a str,
    /// `YYYY-MM-DD`
    pub last_visit_date: &'a str,
    /// Frequency
    pub frequency: CheckupFrequency,
    /// `HH:MM`
    pub reminder_time: &'a str,
}

/// Opaque push subscription descriptor, forwarded verbatim to the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Push service endpoint
    pub endpoint: String,
    /// Expiry, when the push service sets one
    #[serde(rename = "expirationTime")]
    pub expiration_time: Option<u64>,
    /// Client keys
    pub keys: SubscriptionKeys,
}

/// Client keys of a push subscription
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// P256dh
    pub p256dh: String,
    /// Auth
    pub auth: String,
}

// =============================================================================
// Responses
// =============================================================================

/// `POST /login` response
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// User id
    pub user_id: UserId,
    /// A saved plan exists
    #[serde(default)]
    pub has_active_plan: bool,
    /// The saved plan belongs to this week
    #[serde(default)]
    pub plan_is_current_week: bool,
}

impl LoginResponse {
    /// Resume the saved plan instead of landing on the dashboard
    #[must_use]
    pub fn resumes_plan(&self) -> bool {
        self.has_active_plan && self.plan_is_current_week
    }
}

/// `POST /register` response
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    /// Message
    pub message: String,
}

impl RegisterResponse {
    /// The backend reports success by wording, not status
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.message.contains("successfully")
    }
}

/// Envelope for `GET /available_foods/{id}`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AvailableFoodsEnvelope {
    pub foods_by_meal: std::collections::BTreeMap<MealSlot, Vec<FoodRecord>>,
}

impl From<AvailableFoodsEnvelope> for AvailableFoods {
    fn from(envelope: AvailableFoodsEnvelope) -> Self {
        AvailableFoods::from_slots(envelope.foods_by_meal)
    }
}

/// Envelope carrying a `meal_plan`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct MealPlanEnvelope {
    pub meal_plan: WeeklyMealPlan,
}

/// Envelope carrying `consumption_status`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ConsumptionEnvelope {
    pub consumption_status: ConsumptionStatus,
}

/// Envelope carrying `day_completion`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DayCompletionEnvelope {
    pub day_completion: DayCompletion,
}

/// Envelope carrying `weekly_dashboard`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WeeklyDashboardEnvelope {
    pub weekly_dashboard: WeeklyDashboard,
}

/// Envelope carrying a chat `response`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ChatEnvelope {
    pub response: String,
}

/// Generic `{success, message}` acknowledgement
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    /// Success
    #[serde(default)]
    pub success: bool,
    /// Message
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /mark_consumed_for_date` response
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MarkConsumedResponse {
    /// Success
    pub success: bool,
    /// Message
    #[serde(default)]
    pub message: String,
    /// State of the slot after the backend toggled it
    #[serde(default)]
    pub consumed: Option<bool>,
}

/// `POST /setup_reminders` response
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReminderSetup {
    /// Success
    #[serde(default)]
    pub success: bool,
    /// Total reminders
    pub total_reminders: u32,
    /// Meal reminders
    #[serde(default)]
    pub meal_reminders: u32,
    /// Water reminders
    #[serde(default)]
    pub water_reminders: u32,
    /// Doctor reminders
    #[serde(default)]
    pub doctor_reminders: u32,
    /// Human-readable feature list
    #[serde(default)]
    pub features: Vec<String>,
}

/// `POST /trigger_all_reminders/{id}` response
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TriggerAllResponse {
    /// Success
    pub success: bool,
    /// Total reminders triggered
    #[serde(default)]
    pub total_reminders_triggered: u32,
    /// Backend clock at trigger time
    #[serde(default)]
    pub current_time: Option<String>,
}

/// `GET /check_reminders/{id}` response
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CheckRemindersResponse {
    /// Success
    pub success: bool,
    /// Reminders the check fired; opaque to the client
    #[serde(default)]
    pub reminders: Vec<serde_json::Value>,
    /// Total active reminders
    #[serde(default)]
    pub total_active_reminders: u32,
}

/// `POST /setup_doctor_reminder` response
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DoctorReminderResponse {
    /// Success
    #[serde(default)]
    pub success: bool,
    /// Date of the next reminder
    #[serde(default)]
    pub next_reminder: String,
    /// Frequency
    #[serde(default)]
    pub frequency: String,
    /// Backend error text when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}
