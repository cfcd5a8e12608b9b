//! HTTP Gateway Implementation
//!
//! [`BackendGateway`] over the backend's JSON REST surface, using reqwest.
//!
//! # Response Handling
//!
//! Every call goes through [`HttpGateway::execute`]:
//! - transport errors become [`GatewayError::Transport`]
//! - non-2xx becomes [`GatewayError::Backend`] with the body's `error` text
//!   when present
//! - 2xx without the operation's required field becomes
//!   [`GatewayError::MissingField`]
//! - anything that then fails to deserialize becomes [`GatewayError::Decode`]

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::{BackendGateway, GatewayError, Operation};
use super::types::{
    Ack, AvailableFoodsEnvelope, ChatEnvelope, ChatRequest, CheckRemindersResponse,
    ConsumptionEnvelope, DayCompletionEnvelope, DoctorReminderRequest, DoctorReminderResponse,
    GeneratePlanRequest, LoginRequest, LoginResponse, MarkConsumedRequest, MarkConsumedResponse,
    MealPlanEnvelope, PushSubscription, RegisterRequest, RegisterResponse, ReminderSetup,
    SavePlanRequest, SetupRemindersRequest, SubscribePushRequest, TriggerAllResponse,
    WeeklyDashboardEnvelope,
};
use crate::config::PlannerConfig;
use crate::domain::{
    AvailableFoods, ConsumptionStatus, DayCompletion, HealthDashboard, MealRecord, MealSlot,
    SelectedFoods, UserId, WeeklyDashboard, WeeklyMealPlan, Weekday,
};

/// Backend client over HTTP
#[derive(Clone)]
pub struct HttpGateway {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Create from loaded configuration
    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client.get(self.url(path))
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        self.http_client.post(self.url(path)).json(body)
    }

    /// Send a request and classify the response
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        tracing::debug!(%operation, "Sending backend request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%operation, error = %e, "Backend request failed");
            GatewayError::Transport {
                operation,
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Transport {
            operation,
            detail: e.to_string(),
        })?;
        let value: Option<serde_json::Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let error_text = value
                .as_ref()
                .and_then(|v| v.get("error"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            tracing::warn!(
                %operation,
                status = status.as_u16(),
                error = error_text.as_deref().unwrap_or(""),
                "Backend returned an error status"
            );
            return Err(GatewayError::backend(operation, status.as_u16(), error_text));
        }

        let Some(value) = value else {
            return Err(GatewayError::Decode {
                operation,
                detail: "response body is not JSON".to_string(),
            });
        };

        if let Some(field) = operation.required_field() {
            if value.get(field).map_or(true, serde_json::Value::is_null) {
                tracing::warn!(%operation, field, "Backend response missing expected field");
                return Err(GatewayError::MissingField { operation, field });
            }
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(%operation, error = %e, "Failed to decode backend response");
            GatewayError::Decode {
                operation,
                detail: e.to_string(),
            }
        })
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        self.execute(Operation::Login, self.post("/login", request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, GatewayError> {
        self.execute(Operation::Register, self.post("/register", request))
            .await
    }

    async fn list_available_foods(&self, user: UserId) -> Result<AvailableFoods, GatewayError> {
        let envelope: AvailableFoodsEnvelope = self
            .execute(
                Operation::ListAvailableFoods,
                self.get(&format!("/available_foods/{user}")),
            )
            .await?;
        Ok(envelope.into())
    }

    async fn generate_weekly_plan(
        &self,
        user: UserId,
        selected: &SelectedFoods,
    ) -> Result<WeeklyMealPlan, GatewayError> {
        let body = GeneratePlanRequest {
            user_id: user,
            selected_foods: selected,
        };
        let envelope: MealPlanEnvelope = self
            .execute(
                Operation::GenerateWeeklyPlan,
                self.post("/generate_weekly_meal_plan", &body),
            )
            .await?;
        Ok(envelope.meal_plan)
    }

    async fn persist_plan(
        &self,
        user: UserId,
        plan: &WeeklyMealPlan,
        selected: &SelectedFoods,
    ) -> Result<Ack, GatewayError> {
        let body = SavePlanRequest {
            user_id: user,
            meal_plan: plan,
            selected_foods: selected,
        };
        self.execute(Operation::PersistPlan, self.post("/save_meal_plan", &body))
            .await
    }

    async fn load_saved_plan(&self, user: UserId) -> Result<WeeklyMealPlan, GatewayError> {
        let envelope: MealPlanEnvelope = self
            .execute(
                Operation::LoadSavedPlan,
                self.get(&format!("/get_saved_meal_plan/{user}")),
            )
            .await?;
        Ok(envelope.meal_plan)
    }

    async fn mark_consumed(
        &self,
        user: UserId,
        slot: MealSlot,
        date: &str,
        foods: &[MealRecord],
    ) -> Result<MarkConsumedResponse, GatewayError> {
        let body = MarkConsumedRequest {
            user_id: user,
            meal_type: slot,
            date,
            foods,
        };
        self.execute(
            Operation::MarkConsumed,
            self.post("/mark_consumed_for_date", &body),
        )
        .await
    }

    async fn clear_consumption(&self, user: UserId) -> Result<Ack, GatewayError> {
        let request = self
            .http_client
            .post(self.url(&format!("/clear_consumption_status/{user}")));
        self.execute(Operation::ClearConsumption, request).await
    }

    async fn fetch_consumption_status(
        &self,
        user: UserId,
    ) -> Result<ConsumptionStatus, GatewayError> {
        let envelope: ConsumptionEnvelope = self
            .execute(
                Operation::FetchConsumptionStatus,
                self.get(&format!("/get_consumption_status/{user}")),
            )
            .await?;
        Ok(envelope.consumption_status)
    }

    async fn fetch_day_completion(&self, user: UserId) -> Result<DayCompletion, GatewayError> {
        let envelope: DayCompletionEnvelope = self
            .execute(
                Operation::FetchDayCompletion,
                self.get(&format!("/get_day_completion_status/{user}")),
            )
            .await?;
        Ok(envelope.day_completion)
    }

    async fn fetch_weekly_dashboard(
        &self,
        user: UserId,
    ) -> Result<WeeklyDashboard, GatewayError> {
        let envelope: WeeklyDashboardEnvelope = self
            .execute(
                Operation::FetchWeeklyDashboard,
                self.get(&format!("/get_weekly_dashboard/{user}")),
            )
            .await?;
        Ok(envelope.weekly_dashboard)
    }

    async fn fetch_health_dashboard(
        &self,
        user: UserId,
    ) -> Result<HealthDashboard, GatewayError> {
        self.execute(
            Operation::FetchHealthDashboard,
            self.get(&format!("/health_dashboard/{user}")),
        )
        .await
    }

    async fn send_chat_message(
        &self,
        user: Option<UserId>,
        message: &str,
        current_day: Weekday,
        plan: Option<&WeeklyMealPlan>,
    ) -> Result<String, GatewayError> {
        let body = ChatRequest {
            user_id: user,
            message,
            current_day,
            meal_plan: plan,
        };
        let envelope: ChatEnvelope = self
            .execute(Operation::SendChatMessage, self.post("/chat", &body))
            .await?;
        Ok(envelope.response)
    }

    async fn register_push_subscription(
        &self,
        user: UserId,
        subscription: &PushSubscription,
    ) -> Result<Ack, GatewayError> {
        let body = SubscribePushRequest {
            user_id: user,
            subscription,
        };
        self.execute(
            Operation::RegisterPushSubscription,
            self.post("/subscribe_push", &body),
        )
        .await
    }

    async fn request_reminder_setup(&self, user: UserId) -> Result<ReminderSetup, GatewayError> {
        let body = SetupRemindersRequest { user_id: user };
        self.execute(
            Operation::RequestReminderSetup,
            self.post("/setup_reminders", &body),
        )
        .await
    }

    async fn trigger_test_push(&self, user: UserId) -> Result<Ack, GatewayError> {
        let request = self.http_client.post(self.url(&format!("/test_push/{user}")));
        self.execute(Operation::TriggerTestPush, request).await
    }

    async fn trigger_all_reminders(
        &self,
        user: UserId,
    ) -> Result<TriggerAllResponse, GatewayError> {
        let request = self
            .http_client
            .post(self.url(&format!("/trigger_all_reminders/{user}")));
        self.execute(Operation::TriggerAllReminders, request).await
    }

    async fn check_reminders(&self, user: UserId) -> Result<CheckRemindersResponse, GatewayError> {
        let request = self
            .get(&format!("/check_reminders/{user}"))
            .query(&[("force_check", "true")]);
        self.execute(Operation::CheckReminders, request).await
    }

    async fn setup_doctor_reminder(
        &self,
        request: &DoctorReminderRequest<'_>,
    ) -> Result<DoctorReminderResponse, GatewayError> {
        self.execute(
            Operation::SetupDoctorReminder,
            self.post("/setup_doctor_reminder", request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new("http://127.0.0.1:5000/", Duration::from_secs(1));
        assert_eq!(gateway.base_url(), "http://127.0.0.1:5000");
        assert_eq!(gateway.url("/login"), "http://127.0.0.1:5000/login");
    }

    #[test]
    fn test_default_points_at_local_backend() {
        let gateway = HttpGateway::default();
        assert_eq!(gateway.base_url(), "http://127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is closed on test hosts
        let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = gateway.load_saved_plan(UserId(1)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
        assert_eq!(err.user_message(), "Failed to load saved meal plan");
    }
}
