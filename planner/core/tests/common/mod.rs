//! Shared test doubles for the controller scenarios
//!
//! `MockGateway` answers every backend operation from a script and records
//! what was called. Consumption is kept in memory and flipped on every
//! mark-consumed, the way the backend does it.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::mpsc;

use planner_core::gateway::{
    Ack, CheckRemindersResponse, DoctorReminderRequest, DoctorReminderResponse, LoginRequest,
    LoginResponse, MarkConsumedResponse, PushSubscription, RegisterRequest, RegisterResponse,
    ReminderSetup, SubscriptionKeys, TriggerAllResponse,
};
use planner_core::domain::DayMeals;
use planner_core::push::WorkerRegistration;
use planner_core::{
    AvailableFoods, BackendGateway, ConsumptionStatus, Controller, ControllerConfig,
    DayCompletion, FoodRecord, GatewayError, HealthDashboard, MealRecord, MealSlot, Operation,
    Permission, PlannerMessage, PlatformError, PushPlatform, SelectedFoods, UserId,
    WeeklyDashboard, WeeklyMealPlan, Weekday,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Sunday 3 March 2024
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
}

pub fn food(name: &str) -> FoodRecord {
    FoodRecord {
        food: name.to_string(),
        calories: 120.0,
        protein: 4.0,
        carbs: 20.0,
        fat: 2.0,
        veg_type: "veg".to_string(),
    }
}

pub fn meal(name: &str) -> MealRecord {
    MealRecord {
        food: name.to_string(),
        calories: 120.0,
        protein: 4.0,
        fat: 2.0,
        carbs: 20.0,
        veg_type: "veg".to_string(),
        is_user_selected: true,
    }
}

/// One meal per slot on every day
pub fn sample_plan() -> WeeklyMealPlan {
    let days = Weekday::ALL
        .iter()
        .map(|day| {
            let meals: DayMeals = MealSlot::ALL
                .iter()
                .map(|slot| (*slot, vec![meal(&format!("{} {}", day.short(), slot.key()))]))
                .collect();
            (*day, meals)
        })
        .collect();
    WeeklyMealPlan::from_days(days)
}

pub fn backend_error(operation: Operation, status: u16, text: &str) -> GatewayError {
    GatewayError::backend(operation, status, Some(text.to_string()))
}

// =============================================================================
// Mock gateway
// =============================================================================

/// Answers for each scripted operation
#[derive(Clone)]
pub struct Script {
    pub login: Result<LoginResponse, GatewayError>,
    pub register: Result<RegisterResponse, GatewayError>,
    pub plan: Result<WeeklyMealPlan, GatewayError>,
    pub persist: Result<Ack, GatewayError>,
    pub clear: Result<Ack, GatewayError>,
    pub chat: Result<String, GatewayError>,
    pub reminder_setup: Result<ReminderSetup, GatewayError>,
    pub test_push: Result<Ack, GatewayError>,
    pub doctor: Result<DoctorReminderResponse, GatewayError>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            login: Ok(LoginResponse {
                user_id: UserId(7),
                has_active_plan: false,
                plan_is_current_week: false,
            }),
            register: Ok(RegisterResponse {
                message: "User registered successfully".to_string(),
            }),
            plan: Ok(sample_plan()),
            persist: Ok(Ack {
                success: true,
                message: None,
            }),
            clear: Ok(Ack {
                success: true,
                message: None,
            }),
            chat: Ok("Try adding more greens.".to_string()),
            reminder_setup: Ok(ReminderSetup {
                success: true,
                total_reminders: 5,
                meal_reminders: 3,
                water_reminders: 1,
                doctor_reminders: 1,
                features: Vec::new(),
            }),
            test_push: Ok(Ack {
                success: true,
                message: None,
            }),
            doctor: Ok(DoctorReminderResponse {
                success: true,
                next_reminder: "2024-04-10".to_string(),
                frequency: "monthly".to_string(),
                error: None,
            }),
        }
    }
}

#[derive(Default)]
pub struct MockGateway {
    script: Mutex<Script>,
    calls: Mutex<Vec<Operation>>,
    consumed: Mutex<BTreeMap<String, BTreeMap<MealSlot, bool>>>,
    marked: Mutex<Vec<(MealSlot, String, usize)>>,
}

impl MockGateway {
    pub fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    pub fn script(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    /// `(slot, date, food count)` for every mark-consumed request
    pub fn marked(&self) -> Vec<(MealSlot, String, usize)> {
        self.marked.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation) {
        self.calls.lock().unwrap().push(operation);
    }

    fn answer<T>(
        &self,
        operation: Operation,
        pick: impl FnOnce(&Script) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        self.record(operation);
        pick(&self.script.lock().unwrap())
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        self.answer(Operation::Login, |s| s.login.clone())
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<RegisterResponse, GatewayError> {
        self.answer(Operation::Register, |s| s.register.clone())
    }

    async fn list_available_foods(&self, _user: UserId) -> Result<AvailableFoods, GatewayError> {
        self.record(Operation::ListAvailableFoods);
        let slots = MealSlot::ALL
            .iter()
            .map(|slot| (*slot, vec![food("Oats"), food("Idli")]))
            .collect();
        Ok(AvailableFoods::from_slots(slots))
    }

    async fn generate_weekly_plan(
        &self,
        _user: UserId,
        _selected: &SelectedFoods,
    ) -> Result<WeeklyMealPlan, GatewayError> {
        self.answer(Operation::GenerateWeeklyPlan, |s| s.plan.clone())
    }

    async fn persist_plan(
        &self,
        _user: UserId,
        _plan: &WeeklyMealPlan,
        _selected: &SelectedFoods,
    ) -> Result<Ack, GatewayError> {
        self.answer(Operation::PersistPlan, |s| s.persist.clone())
    }

    async fn load_saved_plan(&self, _user: UserId) -> Result<WeeklyMealPlan, GatewayError> {
        self.answer(Operation::LoadSavedPlan, |s| s.plan.clone())
    }

    async fn mark_consumed(
        &self,
        _user: UserId,
        slot: MealSlot,
        date: &str,
        foods: &[MealRecord],
    ) -> Result<MarkConsumedResponse, GatewayError> {
        self.record(Operation::MarkConsumed);
        self.marked
            .lock()
            .unwrap()
            .push((slot, date.to_string(), foods.len()));

        let mut consumed = self.consumed.lock().unwrap();
        let flag = consumed
            .entry(date.to_string())
            .or_default()
            .entry(slot)
            .or_insert(false);
        *flag = !*flag;

        Ok(MarkConsumedResponse {
            success: true,
            message: if *flag {
                "Meal marked as consumed".to_string()
            } else {
                "Meal unmarked".to_string()
            },
            consumed: Some(*flag),
        })
    }

    async fn clear_consumption(&self, _user: UserId) -> Result<Ack, GatewayError> {
        let result = self.answer(Operation::ClearConsumption, |s| s.clear.clone());
        if result.is_ok() {
            self.consumed.lock().unwrap().clear();
        }
        result
    }

    async fn fetch_consumption_status(
        &self,
        _user: UserId,
    ) -> Result<ConsumptionStatus, GatewayError> {
        self.record(Operation::FetchConsumptionStatus);
        Ok(ConsumptionStatus::from_dates(
            self.consumed.lock().unwrap().clone(),
        ))
    }

    async fn fetch_day_completion(&self, _user: UserId) -> Result<DayCompletion, GatewayError> {
        self.record(Operation::FetchDayCompletion);
        Ok(DayCompletion::default())
    }

    async fn fetch_weekly_dashboard(
        &self,
        _user: UserId,
    ) -> Result<WeeklyDashboard, GatewayError> {
        self.record(Operation::FetchWeeklyDashboard);
        Ok(WeeklyDashboard::default())
    }

    async fn fetch_health_dashboard(
        &self,
        _user: UserId,
    ) -> Result<HealthDashboard, GatewayError> {
        self.record(Operation::FetchHealthDashboard);
        Ok(HealthDashboard::default())
    }

    async fn send_chat_message(
        &self,
        _user: Option<UserId>,
        _message: &str,
        _current_day: Weekday,
        _plan: Option<&WeeklyMealPlan>,
    ) -> Result<String, GatewayError> {
        self.answer(Operation::SendChatMessage, |s| s.chat.clone())
    }

    async fn register_push_subscription(
        &self,
        _user: UserId,
        _subscription: &PushSubscription,
    ) -> Result<Ack, GatewayError> {
        self.record(Operation::RegisterPushSubscription);
        Ok(Ack {
            success: true,
            message: None,
        })
    }

    async fn request_reminder_setup(&self, _user: UserId) -> Result<ReminderSetup, GatewayError> {
        self.answer(Operation::RequestReminderSetup, |s| s.reminder_setup.clone())
    }

    async fn trigger_test_push(&self, _user: UserId) -> Result<Ack, GatewayError> {
        self.answer(Operation::TriggerTestPush, |s| s.test_push.clone())
    }

    async fn trigger_all_reminders(
        &self,
        _user: UserId,
    ) -> Result<TriggerAllResponse, GatewayError> {
        self.record(Operation::TriggerAllReminders);
        Ok(TriggerAllResponse {
            success: true,
            total_reminders_triggered: 4,
            current_time: None,
        })
    }

    async fn check_reminders(&self, _user: UserId) -> Result<CheckRemindersResponse, GatewayError> {
        self.record(Operation::CheckReminders);
        Ok(CheckRemindersResponse {
            success: true,
            reminders: Vec::new(),
            total_active_reminders: 5,
        })
    }

    async fn setup_doctor_reminder(
        &self,
        _request: &DoctorReminderRequest<'_>,
    ) -> Result<DoctorReminderResponse, GatewayError> {
        self.answer(Operation::SetupDoctorReminder, |s| s.doctor.clone())
    }
}

// =============================================================================
// Mock push platform
// =============================================================================

pub struct MockPlatform {
    permission: Permission,
    subscribe_fails: bool,
    steps: Mutex<Vec<&'static str>>,
    local: Mutex<Vec<String>>,
}

impl MockPlatform {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            subscribe_fails: false,
            steps: Mutex::new(Vec::new()),
            local: Mutex::new(Vec::new()),
        }
    }

    pub fn without_push_service(mut self) -> Self {
        self.subscribe_fails = true;
        self
    }

    pub fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().unwrap().clone()
    }

    /// Titles of local notifications shown
    pub fn local_titles(&self) -> Vec<String> {
        self.local.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushPlatform for MockPlatform {
    async fn request_permission(&self) -> Permission {
        self.steps.lock().unwrap().push("permission");
        self.permission
    }

    async fn register_worker(&self, script_path: &str) -> Result<WorkerRegistration, PlatformError> {
        self.steps.lock().unwrap().push("register_worker");
        Ok(WorkerRegistration {
            script_path: script_path.to_string(),
            scope: "/diet-planner/".to_string(),
        })
    }

    async fn subscribe(
        &self,
        _registration: &WorkerRegistration,
        application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError> {
        self.steps.lock().unwrap().push("subscribe");
        if self.subscribe_fails {
            return Err(PlatformError::Unsupported);
        }
        assert_eq!(application_server_key.len(), 65);
        Ok(PushSubscription {
            endpoint: "https://push.example/abc".to_string(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "p256dh".to_string(),
                auth: "auth".to_string(),
            },
        })
    }

    async fn show_local(&self, title: &str, _body: &str) -> Result<(), PlatformError> {
        self.local.lock().unwrap().push(title.to_string());
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub controller: Controller<MockGateway>,
    pub platform: Arc<MockPlatform>,
    pub rx: mpsc::Receiver<PlannerMessage>,
}

impl Harness {
    pub fn new(script: Script) -> Self {
        Self::with_platform(script, MockPlatform::new(Permission::Granted))
    }

    pub fn with_platform(script: Script, platform: MockPlatform) -> Self {
        let (tx, rx) = mpsc::channel(256);
        let platform = Arc::new(platform);
        let config = ControllerConfig {
            auto_login_delay: Duration::from_millis(5),
            ..ControllerConfig::default()
        };
        let controller = Controller::new(
            MockGateway::with_script(script),
            Arc::clone(&platform) as Arc<dyn PushPlatform>,
            config,
            tx,
        )
        .with_clock(sunday);

        Self {
            controller,
            platform,
            rx,
        }
    }

    /// Every message sent since the last drain
    pub fn drain(&mut self) -> Vec<PlannerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Text of the last notification since the last drain
    pub fn last_notice(&mut self) -> Option<String> {
        self.drain().into_iter().rev().find_map(|msg| match msg {
            PlannerMessage::Notify { message, .. } => Some(message),
            _ => None,
        })
    }

    pub async fn act(&mut self, action: planner_core::UserAction) {
        self.controller.handle_action(action).await;
        self.controller.settle().await;
    }

    /// Log in through the form with the scripted response
    pub async fn login(&mut self) {
        self.act(planner_core::UserAction::ChooseLogin).await;
        self.act(planner_core::UserAction::SubmitLogin(
            planner_core::LoginForm::new("asha", "pw"),
        ))
        .await;
    }
}
