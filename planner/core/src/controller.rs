//! Controller - The Planner Core
//!
//! The controller owns the [`AppState`] and is its only writer. It:
//! - turns [`UserAction`]s into state changes and screen transitions
//! - spawns backend calls as effects and applies their outcomes
//! - runs the push registration pipeline
//! - tells the surface what happened through [`PlannerMessage`]s
//!
//! # Design Philosophy
//!
//! Like the rest of the core, the controller is UI-agnostic. A surface sends
//! actions in and renders from [`Controller::state`]; it never waits on the
//! network. Every request runs as its own tokio task that posts an
//! [`EffectOutcome`] back over a channel, and the surface drains them with
//! [`Controller::poll_effects`] on its tick.
//!
//! Outcomes that belong to a session are tagged with its user id. An outcome
//! that arrives after that session ended is dropped rather than applied to
//! whoever is logged in now.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc;

use crate::calendar;
use crate::chat::ChatEntry;
use crate::config::{PlannerConfig, PushSettings};
use crate::domain::{
    CheckupFrequency, MealSlot, SelectedFoods, Session, UserId, WeeklyMealPlan, Weekday,
};
use crate::events::{LoginForm, RegistrationForm, UserAction};
use crate::gateway::{
    Ack, BackendGateway, CheckRemindersResponse, DoctorReminderRequest, DoctorReminderResponse,
    GatewayError, LoginRequest, LoginResponse, MarkConsumedResponse, RegisterResponse,
    TriggerAllResponse,
};
use crate::messages::{NotifyLevel, PlannerMessage};
use crate::push::{PushPlatform, PushRegistrar, RegistrationReport};
use crate::screen::{transition, Refresh, Screen, Trigger};
use crate::state::{AppState, Confirmation, DoctorForm, StateChange};

const DOCTOR_TYPE: &str = "General Checkup";
const DOCTOR_REMINDER_TIME: &str = "10:00";

const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";
const PUSH_NOT_ENABLED: &str =
    "Please enable push notifications first by clicking \"Enable Smart Reminders\"";

/// Controller configuration
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Delay between a successful registration and the automatic login
    pub auto_login_delay: Duration,
    /// Push registration settings
    pub push: PushSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for ControllerConfig {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            auto_login_delay: config.auto_login_delay,
            push: config.push.clone(),
        }
    }
}

/// How a login request was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginOrigin {
    /// The login form
    Form,
    /// The automatic login after registration
    AutoLogin,
}

/// Completion of a spawned effect
#[derive(Debug)]
pub enum EffectOutcome {
    /// A login request answered
    LoggedIn {
        /// Name typed into the form
        name: String,
        /// Form or auto-login
        origin: LoginOrigin,
        /// Backend answer
        result: Result<LoginResponse, GatewayError>,
    },
    /// A registration request answered
    Registered {
        /// Credentials reused for the automatic login
        credentials: LoginRequest,
        /// Backend answer
        result: Result<RegisterResponse, GatewayError>,
    },
    /// The saved plan of a resumed session arrived
    SavedPlanLoaded {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<WeeklyMealPlan, GatewayError>,
    },
    /// A cache refresh finished
    Refreshed {
        /// Session owner
        user: UserId,
        /// Which cache
        refresh: Refresh,
        /// The change to apply
        result: Result<StateChange, GatewayError>,
    },
    /// Plan generation answered
    PlanGenerated {
        /// Session owner
        user: UserId,
        /// Selections the plan was generated from
        selected: SelectedFoods,
        /// Backend answer
        result: Result<WeeklyMealPlan, GatewayError>,
    },
    /// Plan persistence answered
    PlanPersisted {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<Ack, GatewayError>,
    },
    /// A consumption toggle answered
    ConsumptionMarked {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<MarkConsumedResponse, GatewayError>,
    },
    /// Consumption history cleared ahead of regeneration
    ConsumptionCleared {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<Ack, GatewayError>,
    },
    /// The assistant replied
    ChatReplied {
        /// Session owner
        user: UserId,
        /// Reply text
        result: Result<String, GatewayError>,
    },
    /// The push registration pipeline finished
    RemindersRegistered {
        /// Session owner
        user: UserId,
        /// Per-step outcomes
        report: RegistrationReport,
    },
    /// Test push answered
    TestPushSent {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<Ack, GatewayError>,
    },
    /// Trigger-all answered
    AllRemindersTriggered {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<TriggerAllResponse, GatewayError>,
    },
    /// Reminder check answered
    RemindersChecked {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<CheckRemindersResponse, GatewayError>,
    },
    /// Doctor reminder setup answered
    DoctorReminderSet {
        /// Session owner
        user: UserId,
        /// Backend answer
        result: Result<DoctorReminderResponse, GatewayError>,
    },
}

impl EffectOutcome {
    /// Session the outcome belongs to; `None` for pre-session requests
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        match self {
            Self::LoggedIn { .. } | Self::Registered { .. } => None,
            Self::SavedPlanLoaded { user, .. }
            | Self::Refreshed { user, .. }
            | Self::PlanGenerated { user, .. }
            | Self::PlanPersisted { user, .. }
            | Self::ConsumptionMarked { user, .. }
            | Self::ConsumptionCleared { user, .. }
            | Self::ChatReplied { user, .. }
            | Self::RemindersRegistered { user, .. }
            | Self::TestPushSent { user, .. }
            | Self::AllRemindersTriggered { user, .. }
            | Self::RemindersChecked { user, .. }
            | Self::DoctorReminderSet { user, .. } => Some(*user),
        }
    }
}

/// The Controller - headless planner core
pub struct Controller<G: BackendGateway> {
    config: ControllerConfig,
    gateway: Arc<G>,
    platform: Arc<dyn PushPlatform>,
    registrar: PushRegistrar,
    state: AppState,
    /// Channel to the UI surface
    tx: mpsc::Sender<PlannerMessage>,
    effects_tx: mpsc::UnboundedSender<EffectOutcome>,
    effects_rx: mpsc::UnboundedReceiver<EffectOutcome>,
    /// Spawned effects whose outcome has not been applied yet
    in_flight: usize,
    clock: fn() -> NaiveDate,
}

impl<G: BackendGateway + 'static> Controller<G> {
    /// Create a controller on the home screen
    pub fn new(
        gateway: G,
        platform: Arc<dyn PushPlatform>,
        config: ControllerConfig,
        tx: mpsc::Sender<PlannerMessage>,
    ) -> Self {
        let (effects_tx, effects_rx) = mpsc::unbounded_channel();
        let clock: fn() -> NaiveDate = calendar::local_today;

        Self {
            registrar: PushRegistrar::new(config.push.clone()),
            config,
            gateway: Arc::new(gateway),
            platform,
            state: AppState::new(calendar::weekday_of(clock())),
            tx,
            effects_tx,
            effects_rx,
            in_flight: 0,
            clock,
        }
    }

    /// Replace the source of "today"
    ///
    /// Resets the state so the preselected day follows the new clock.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self.state = AppState::new(calendar::weekday_of(clock()));
        self
    }

    /// Current state, for rendering
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Backend gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Number of effects still running
    pub fn pending_effects(&self) -> usize {
        self.in_flight
    }

    /// Announce the initial screen and session to the surface
    pub async fn start(&mut self) {
        tracing::info!(today = %self.state.current_day(), "Planner controller started");
        self.send(PlannerMessage::ScreenChanged {
            screen: self.state.screen(),
        })
        .await;
        self.send(PlannerMessage::SessionChanged { session: None })
            .await;
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Handle one action from the surface
    pub async fn handle_action(&mut self, action: UserAction) {
        tracing::debug!(?action, screen = %self.state.screen(), "Handling action");

        match action {
            UserAction::ChooseRegister => self.navigate(Trigger::ChooseRegister).await,
            UserAction::ChooseLogin => self.navigate(Trigger::ChooseLogin).await,
            UserAction::NavigateBack => self.navigate(Trigger::NavigateBack).await,
            UserAction::NavigateNext => self.navigate(Trigger::NavigateNext).await,
            UserAction::OpenReminders => self.navigate(Trigger::OpenReminders).await,
            UserAction::ViewProgress => self.navigate(Trigger::ViewProgress).await,
            UserAction::OpenHealthDashboard => self.navigate(Trigger::OpenHealthDashboard).await,
            UserAction::BackToPlan => self.navigate(Trigger::BackToPlan).await,
            UserAction::BackToDashboard => self.navigate(Trigger::BackToDashboard).await,
            UserAction::ChooseFoods => self.choose_foods().await,

            UserAction::SubmitLogin(form) => self.submit_login(&form).await,
            UserAction::SubmitRegistration(form) => self.submit_registration(&form).await,
            UserAction::Logout => self.logout().await,

            UserAction::StartPlanning => self.start_planning().await,
            UserAction::RegeneratePlan => {
                if self.state.screen() == Screen::WeeklyPlan {
                    self.request_confirmation(Confirmation::Regenerate {
                        origin: Screen::WeeklyPlan,
                    })
                    .await;
                }
            }
            UserAction::ConfirmationAnswered { accepted } => {
                self.answer_confirmation(accepted).await;
            }
            UserAction::ToggleFood { slot, food } => {
                self.state.apply(StateChange::FoodToggled { slot, food });
            }
            UserAction::GeneratePlan => self.generate_plan().await,
            UserAction::SelectDay(day) => self.state.apply(StateChange::DaySelected(day)),
            UserAction::MarkConsumed { day, slot } => self.mark_consumed(day, slot),

            UserAction::SendChat(text) => self.send_chat(&text),

            UserAction::EnableReminders => self.enable_reminders(),
            UserAction::TestPush => self.test_push(),
            UserAction::TriggerAllReminders => self.trigger_all_reminders(),
            UserAction::CheckReminders => self.check_reminders(),
            UserAction::UpdateDoctorForm {
                last_visit_date,
                frequency,
            } => {
                self.state.apply(StateChange::DoctorFormUpdated(DoctorForm {
                    last_visit_date,
                    frequency,
                }));
            }
            UserAction::SetupDoctorReminder => self.setup_doctor_reminder().await,

            UserAction::Quit => self.shutdown().await,
        }
    }

    async fn submit_login(&mut self, form: &LoginForm) {
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.notify(NotifyLevel::Error, &e.to_string()).await;
                return;
            }
        };

        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("login", async move {
            let result = gateway.login(&request).await;
            EffectOutcome::LoggedIn {
                name: request.name,
                origin: LoginOrigin::Form,
                result,
            }
        });
    }

    async fn submit_registration(&mut self, form: &RegistrationForm) {
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.notify(NotifyLevel::Error, &e.to_string()).await;
                return;
            }
        };

        self.notify(NotifyLevel::Info, "Creating account...").await;

        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("register", async move {
            let result = gateway.register(&request).await;
            EffectOutcome::Registered {
                credentials: LoginRequest {
                    name: request.name,
                    password: request.password,
                },
                result,
            }
        });
    }

    async fn logout(&mut self) {
        let from = self.state.screen();
        if let Some(session) = self.state.session() {
            tracing::info!(user = %session.id, "Session ended");
        }
        self.state.apply(StateChange::SessionEnded);
        self.send(PlannerMessage::SessionChanged { session: None })
            .await;
        if let Some(target) = transition(from, Trigger::Logout) {
            self.enter_screen(target).await;
        }
    }

    async fn start_planning(&mut self) {
        if self.state.screen() != Screen::Dashboard {
            return;
        }
        if self.state.meal_plan().is_some() {
            self.request_confirmation(Confirmation::Regenerate {
                origin: Screen::Dashboard,
            })
            .await;
        } else {
            self.notify(NotifyLevel::Success, "Let's create your personalized meal plan!")
                .await;
            self.navigate(Trigger::StartPlanning).await;
        }
    }

    async fn request_confirmation(&mut self, confirmation: Confirmation) {
        self.state
            .apply(StateChange::ConfirmationRequested(confirmation));
        self.send(PlannerMessage::ConfirmRequested {
            prompt: confirmation.prompt().to_string(),
        })
        .await;
    }

    async fn answer_confirmation(&mut self, accepted: bool) {
        let Some(confirmation) = self.state.pending_confirmation() else {
            tracing::debug!("Confirmation answer without a pending prompt");
            return;
        };
        self.state.apply(StateChange::ConfirmationCleared);

        if !accepted {
            tracing::debug!(?confirmation, "Confirmation declined");
            return;
        }

        match confirmation {
            Confirmation::Regenerate { .. } => {
                let Some(user) = self.session_user() else {
                    return;
                };
                let gateway = Arc::clone(&self.gateway);
                self.spawn_effect("clear-consumption", async move {
                    let result = gateway.clear_consumption(user).await;
                    EffectOutcome::ConsumptionCleared { user, result }
                });
            }
        }
    }

    async fn choose_foods(&mut self) {
        if self.state.screen() == Screen::WeeklyPlan && self.state.meal_plan().is_some() {
            self.request_confirmation(Confirmation::Regenerate {
                origin: Screen::WeeklyPlan,
            })
            .await;
        } else {
            self.navigate(Trigger::ChooseFoods).await;
        }
    }

    async fn generate_plan(&mut self) {
        let Some(user) = self.session_user() else {
            return;
        };
        // A plan is only replaced after its consumption history is cleared
        if self.state.meal_plan().is_some() {
            self.request_confirmation(Confirmation::Regenerate {
                origin: self.state.screen(),
            })
            .await;
            return;
        }
        let selected = self.state.selected_foods().clone();
        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("generate-weekly-plan", async move {
            let result = gateway.generate_weekly_plan(user, &selected).await;
            EffectOutcome::PlanGenerated {
                user,
                selected,
                result,
            }
        });
    }

    fn mark_consumed(&mut self, day: Weekday, slot: MealSlot) {
        let Some(user) = self.session_user() else {
            return;
        };
        let Some(plan) = self.state.meal_plan() else {
            tracing::debug!(%day, ?slot, "Mark consumed without a plan");
            return;
        };

        let foods = plan.meals(day, slot).to_vec();
        let week_start = self
            .state
            .plan_week_start()
            .unwrap_or_else(|| calendar::week_start((self.clock)()));
        let date = calendar::date_key(calendar::date_for_day(day, week_start));

        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("mark-consumed", async move {
            let result = gateway.mark_consumed(user, slot, &date, &foods).await;
            EffectOutcome::ConsumptionMarked { user, result }
        });
    }

    fn send_chat(&mut self, text: &str) {
        let message = text.trim();
        if message.is_empty() || self.state.chat_loading() {
            return;
        }
        let Some(user) = self.session_user() else {
            return;
        };

        self.state
            .apply(StateChange::ChatAppended(ChatEntry::user(message)));
        self.state.apply(StateChange::ChatLoading(true));

        let message = message.to_string();
        let current_day = self.state.current_day();
        let plan = self.state.meal_plan().cloned();
        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("send-chat-message", async move {
            let result = gateway
                .send_chat_message(Some(user), &message, current_day, plan.as_ref())
                .await;
            EffectOutcome::ChatReplied { user, result }
        });
    }

    fn enable_reminders(&mut self) {
        let Some(user) = self.session_user() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let platform = Arc::clone(&self.platform);
        let registrar = self.registrar.clone();
        self.spawn_effect("push-registration", async move {
            let report = registrar.run(gateway.as_ref(), platform.as_ref(), user).await;
            EffectOutcome::RemindersRegistered { user, report }
        });
    }

    fn test_push(&mut self) {
        let Some(user) = self.session_user() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let platform = Arc::clone(&self.platform);
        self.spawn_effect("trigger-test-push", async move {
            let result = gateway.trigger_test_push(user).await;
            if matches!(result, Ok(Ack { success: true, .. })) {
                show_local(
                    platform.as_ref(),
                    "Test Notification",
                    "Your push notification system is working perfectly!",
                )
                .await;
            }
            EffectOutcome::TestPushSent { user, result }
        });
    }

    fn trigger_all_reminders(&mut self) {
        let Some(user) = self.session_user() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let platform = Arc::clone(&self.platform);
        self.spawn_effect("trigger-all-reminders", async move {
            let result = gateway.trigger_all_reminders(user).await;
            if let Ok(TriggerAllResponse {
                success: true,
                total_reminders_triggered,
                ..
            }) = &result
            {
                show_local(
                    platform.as_ref(),
                    "All Reminders Triggered!",
                    &format!(
                        "{total_reminders_triggered} test notifications sent. Check your notification panel!"
                    ),
                )
                .await;
            }
            EffectOutcome::AllRemindersTriggered { user, result }
        });
    }

    fn check_reminders(&mut self) {
        let Some(user) = self.session_user() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("check-reminders", async move {
            let result = gateway.check_reminders(user).await;
            EffectOutcome::RemindersChecked { user, result }
        });
    }

    async fn setup_doctor_reminder(&mut self) {
        let Some(user) = self.session_user() else {
            self.notify(NotifyLevel::Error, "Please login first").await;
            return;
        };
        let DoctorForm {
            last_visit_date,
            frequency,
        } = self.state.doctor_form().clone();
        let Some(last_visit_date) = last_visit_date.filter(|date| !date.trim().is_empty()) else {
            self.notify(NotifyLevel::Error, "Please select your last checkup date")
                .await;
            return;
        };

        self.notify(NotifyLevel::Info, "Setting up doctor reminder...")
            .await;

        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("setup-doctor-reminder", async move {
            let request = doctor_request(user, &last_visit_date, frequency);
            let result = gateway.setup_doctor_reminder(&request).await;
            EffectOutcome::DoctorReminderSet { user, result }
        });
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Apply every effect outcome that has arrived
    ///
    /// Call this regularly; it never waits. Returns true if anything was
    /// applied.
    pub async fn poll_effects(&mut self) -> bool {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.effects_rx.try_recv() {
            outcomes.push(outcome);
        }

        if outcomes.is_empty() {
            return false;
        }

        for outcome in outcomes {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply_outcome(outcome).await;
        }
        true
    }

    /// Wait until every spawned effect, and every effect those spawn, has
    /// been applied
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            let Some(outcome) = self.effects_rx.recv().await else {
                break;
            };
            self.in_flight -= 1;
            self.apply_outcome(outcome).await;
        }
    }

    fn spawn_effect<F>(&mut self, label: &'static str, effect: F)
    where
        F: Future<Output = EffectOutcome> + Send + 'static,
    {
        self.in_flight += 1;
        tracing::debug!(effect = label, in_flight = self.in_flight, "Spawning effect");

        let tx = self.effects_tx.clone();
        tokio::spawn(async move {
            let outcome = effect.await;
            if tx.send(outcome).is_err() {
                tracing::debug!(effect = label, "Controller gone, outcome dropped");
            }
        });
    }

    fn spawn_refresh(&mut self, refresh: Refresh) {
        let Some(user) = self.session_user() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("refresh", async move {
            let result = fetch(gateway.as_ref(), user, refresh).await;
            EffectOutcome::Refreshed {
                user,
                refresh,
                result,
            }
        });
    }

    async fn apply_outcome(&mut self, outcome: EffectOutcome) {
        if let Some(user) = outcome.user() {
            if self.session_user() != Some(user) {
                tracing::debug!(%user, "Dropping outcome from an ended session");
                return;
            }
        }

        match outcome {
            EffectOutcome::LoggedIn {
                name,
                origin,
                result,
            } => self.on_logged_in(name, origin, result).await,

            EffectOutcome::Registered {
                credentials,
                result,
            } => self.on_registered(credentials, result).await,

            EffectOutcome::SavedPlanLoaded { result, .. } => match result {
                Ok(plan) => self.load_plan(plan),
                Err(e) => tracing::warn!(error = %e, "Could not load saved meal plan"),
            },

            EffectOutcome::Refreshed {
                refresh, result, ..
            } => match result {
                Ok(change) => self.state.apply(change),
                Err(e) if refresh.is_silent() => {
                    tracing::warn!(?refresh, error = %e, "Background refresh failed");
                }
                Err(e) => {
                    tracing::warn!(?refresh, error = %e, "Refresh failed");
                    self.notify(NotifyLevel::Error, e.operation().fallback_message())
                        .await;
                }
            },

            EffectOutcome::PlanGenerated {
                user,
                selected,
                result,
            } => self.on_plan_generated(user, selected, result).await,

            EffectOutcome::PlanPersisted { result, .. } => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Meal plan generated but not saved");
                    self.notify(
                        NotifyLevel::Error,
                        "Plan generated, but saving failed. You can still view it.",
                    )
                    .await;
                }
            }

            EffectOutcome::ConsumptionMarked { result, .. } => match result {
                Ok(response) if response.success => {
                    self.notify(NotifyLevel::Success, &response.message).await;
                    for refresh in [
                        Refresh::ConsumptionStatus,
                        Refresh::DayCompletion,
                        Refresh::WeeklyDashboard,
                        Refresh::HealthDashboard,
                    ] {
                        self.spawn_refresh(refresh);
                    }
                }
                Ok(response) => {
                    tracing::warn!(message = %response.message, "Backend declined consumption toggle");
                }
                Err(e) => self.notify(NotifyLevel::Error, &e.user_message()).await,
            },

            EffectOutcome::ConsumptionCleared { result, .. } => match result {
                Ok(_) => {
                    self.state.apply(StateChange::PlanCleared);
                    self.state.apply(StateChange::ConsumptionCleared);
                    self.notify(
                        NotifyLevel::Success,
                        "Ready to create a new meal plan! Select your preferred foods.",
                    )
                    .await;
                    self.navigate(Trigger::RegenerateConfirmed).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Clearing consumption failed");
                    self.notify(
                        NotifyLevel::Error,
                        "Error clearing consumption history. Please try again.",
                    )
                    .await;
                }
            },

            EffectOutcome::ChatReplied { result, .. } => {
                self.state.apply(StateChange::ChatLoading(false));
                let reply = result.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Chat request failed");
                    CHAT_ERROR_REPLY.to_string()
                });
                self.state
                    .apply(StateChange::ChatAppended(ChatEntry::bot(reply)));
            }

            EffectOutcome::RemindersRegistered { report, .. } => {
                if let Some(total) = report.total_reminders() {
                    self.state.apply(StateChange::RemindersActivated(total));
                }
                self.send(report.notification()).await;
            }

            EffectOutcome::TestPushSent { result, .. } => match result {
                Ok(ack) if ack.success => {
                    self.notify(
                        NotifyLevel::Success,
                        "Test notification sent! Check your desktop/mobile notifications.",
                    )
                    .await;
                }
                Err(e) if e.status() == Some(404) => {
                    self.notify(NotifyLevel::Error, PUSH_NOT_ENABLED).await;
                }
                _ => {
                    self.notify(NotifyLevel::Error, "Failed to send test notification")
                        .await;
                }
            },

            EffectOutcome::AllRemindersTriggered { result, .. } => match result {
                Ok(response) if response.success => {
                    self.notify(
                        NotifyLevel::Success,
                        &format!(
                            "{} reminders sent! Check your notifications now.",
                            response.total_reminders_triggered
                        ),
                    )
                    .await;
                }
                _ => {
                    self.notify(
                        NotifyLevel::Error,
                        "Failed to trigger all reminders. Please try again.",
                    )
                    .await;
                }
            },

            EffectOutcome::RemindersChecked { result, .. } => match result {
                Ok(response) if response.success && !response.reminders.is_empty() => {
                    self.notify(
                        NotifyLevel::Success,
                        &format!(
                            "{} reminders triggered! Check your notifications.",
                            response.reminders.len()
                        ),
                    )
                    .await;
                }
                Ok(response) if response.success => {
                    self.notify(
                        NotifyLevel::Info,
                        "Reminder system checked. No reminders to trigger right now.",
                    )
                    .await;
                }
                _ => {
                    self.notify(
                        NotifyLevel::Error,
                        "Failed to check reminders. Please try again.",
                    )
                    .await;
                }
            },

            EffectOutcome::DoctorReminderSet { result, .. } => match result {
                Ok(response) if response.success => {
                    self.state.apply(StateChange::DoctorFormReset);
                    self.notify(
                        NotifyLevel::Success,
                        &format!(
                            "Doctor reminder set! Next checkup reminder: {} ({})",
                            response.next_reminder, response.frequency
                        ),
                    )
                    .await;
                }
                Ok(response) => {
                    let message = response
                        .error
                        .unwrap_or_else(|| "Failed to setup doctor reminder".to_string());
                    self.notify(NotifyLevel::Error, &message).await;
                }
                Err(e) => self.notify(NotifyLevel::Error, &e.user_message()).await,
            },
        }
    }

    async fn on_logged_in(
        &mut self,
        name: String,
        origin: LoginOrigin,
        result: Result<LoginResponse, GatewayError>,
    ) {
        match origin {
            LoginOrigin::Form => match result {
                Ok(response) => {
                    let resume_plan = response.resumes_plan();
                    let user = self.begin_session(Session::new(response.user_id, name)).await;
                    self.navigate(Trigger::LoggedIn { resume_plan }).await;

                    let message = if resume_plan {
                        "Continuing your weekly meal plan. Mark meals as consumed when you eat them!"
                    } else if response.has_active_plan {
                        "Your previous meal plan has expired. Ready to create a new one?"
                    } else {
                        "Welcome back! Let's customize your meal plan."
                    };
                    self.notify(NotifyLevel::Success, message).await;

                    if resume_plan {
                        let gateway = Arc::clone(&self.gateway);
                        self.spawn_effect("load-saved-plan", async move {
                            let result = gateway.load_saved_plan(user).await;
                            EffectOutcome::SavedPlanLoaded { user, result }
                        });
                    }
                }
                Err(e) => self.notify(NotifyLevel::Error, &e.user_message()).await,
            },

            LoginOrigin::AutoLogin => {
                if self.state.session().is_some() {
                    tracing::debug!("Auto-login finished after another login, ignoring");
                    return;
                }
                match result {
                    Ok(response) => {
                        self.begin_session(Session::new(response.user_id, name))
                            .await;
                        self.navigate(Trigger::AutoLogin { succeeded: true }).await;
                        self.notify(
                            NotifyLevel::Success,
                            "Welcome! Let's create your customised meal plan.",
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Auto-login failed");
                        self.notify(
                            NotifyLevel::Success,
                            "Registration successful! Please login to continue.",
                        )
                        .await;
                        self.navigate(Trigger::AutoLogin { succeeded: false }).await;
                    }
                }
            }
        }
    }

    async fn on_registered(
        &mut self,
        credentials: LoginRequest,
        result: Result<RegisterResponse, GatewayError>,
    ) {
        match result {
            Ok(response) if response.succeeded() => {
                self.notify(
                    NotifyLevel::Success,
                    "Account created successfully! Logging you in...",
                )
                .await;

                let delay = self.config.auto_login_delay;
                let gateway = Arc::clone(&self.gateway);
                self.spawn_effect("auto-login", async move {
                    tokio::time::sleep(delay).await;
                    let result = gateway.login(&credentials).await;
                    EffectOutcome::LoggedIn {
                        name: credentials.name,
                        origin: LoginOrigin::AutoLogin,
                        result,
                    }
                });
            }
            Ok(response) => self.notify(NotifyLevel::Info, &response.message).await,
            Err(e) => self.notify(NotifyLevel::Error, &e.user_message()).await,
        }
    }

    async fn on_plan_generated(
        &mut self,
        user: UserId,
        selected: SelectedFoods,
        result: Result<WeeklyMealPlan, GatewayError>,
    ) {
        let plan = match result {
            Ok(plan) => plan,
            Err(e) => {
                self.notify(NotifyLevel::Error, &e.user_message()).await;
                return;
            }
        };

        self.load_plan(plan.clone());
        self.navigate(Trigger::PlanGenerated).await;
        self.notify(NotifyLevel::Success, "Weekly meal plan generated successfully!")
            .await;

        let gateway = Arc::clone(&self.gateway);
        self.spawn_effect("persist-plan", async move {
            let result = gateway.persist_plan(user, &plan, &selected).await;
            EffectOutcome::PlanPersisted { user, result }
        });
    }

    fn load_plan(&mut self, plan: WeeklyMealPlan) {
        let week_start = calendar::week_start((self.clock)());
        self.state
            .apply(StateChange::PlanLoaded { plan, week_start });
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    async fn navigate(&mut self, trigger: Trigger) {
        let from = self.state.screen();
        match transition(from, trigger) {
            Some(target) => self.enter_screen(target).await,
            None => tracing::debug!(%from, ?trigger, "Transition not available here"),
        }
    }

    async fn enter_screen(&mut self, screen: Screen) {
        if screen.requires_session() && self.state.session().is_none() {
            tracing::warn!(%screen, "Refusing to enter a session screen without a session");
            self.notify(NotifyLevel::Error, "Please login first").await;
            return;
        }

        tracing::info!(from = %self.state.screen(), to = %screen, "Screen changed");
        self.state.apply(StateChange::ScreenEntered(screen));
        self.send(PlannerMessage::ScreenChanged { screen }).await;

        for refresh in screen.entry_effects() {
            self.spawn_refresh(*refresh);
        }
    }

    async fn begin_session(&mut self, session: Session) -> UserId {
        let user = session.id;
        tracing::info!(%user, "Session started");
        self.state.apply(StateChange::SessionStarted(session.clone()));
        self.send(PlannerMessage::SessionChanged {
            session: Some(session),
        })
        .await;
        user
    }

    fn session_user(&self) -> Option<UserId> {
        self.state.session().map(|session| session.id)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut down the controller
    ///
    /// Effects still running are left to finish on their own; their
    /// outcomes are never applied.
    pub async fn shutdown(&mut self) {
        tracing::info!(pending = self.in_flight, "Planner controller shutting down");
        self.send(PlannerMessage::Quit {
            message: Some("Goodbye!".to_string()),
        })
        .await;
    }

    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(PlannerMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: PlannerMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

fn doctor_request(
    user_id: UserId,
    last_visit_date: &str,
    frequency: CheckupFrequency,
) -> DoctorReminderRequest<'_> {
    DoctorReminderRequest {
        user_id,
        doctor_type: DOCTOR_TYPE,
        last_visit_date,
        frequency,
        reminder_time: DOCTOR_REMINDER_TIME,
    }
}

async fn show_local(platform: &dyn PushPlatform, title: &str, body: &str) {
    if let Err(e) = platform.show_local(title, body).await {
        tracing::warn!(error = %e, title, "Local notification failed");
    }
}

/// Fetch one cache from the backend
async fn fetch<G>(gateway: &G, user: UserId, refresh: Refresh) -> Result<StateChange, GatewayError>
where
    G: BackendGateway + ?Sized,
{
    Ok(match refresh {
        Refresh::AvailableFoods => {
            StateChange::AvailableFoodsLoaded(gateway.list_available_foods(user).await?)
        }
        Refresh::ConsumptionStatus => {
            StateChange::ConsumptionLoaded(gateway.fetch_consumption_status(user).await?)
        }
        Refresh::DayCompletion => {
            StateChange::DayCompletionLoaded(gateway.fetch_day_completion(user).await?)
        }
        Refresh::WeeklyDashboard => {
            StateChange::WeeklyDashboardLoaded(gateway.fetch_weekly_dashboard(user).await?)
        }
        Refresh::HealthDashboard => {
            StateChange::HealthDashboardLoaded(gateway.fetch_health_dashboard(user).await?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FoodRecord;
    use crate::gateway::HttpGateway;
    use async_trait::async_trait;

    // Grants nothing; these tests never reach the push pipeline
    struct NoPush;

    #[async_trait]
    impl PushPlatform for NoPush {
        async fn request_permission(&self) -> crate::push::Permission {
            crate::push::Permission::Denied
        }

        async fn register_worker(
            &self,
            _script_path: &str,
        ) -> Result<crate::push::WorkerRegistration, crate::push::PlatformError> {
            Err(crate::push::PlatformError::Unsupported)
        }

        async fn subscribe(
            &self,
            _registration: &crate::push::WorkerRegistration,
            _application_server_key: &[u8],
        ) -> Result<crate::gateway::PushSubscription, crate::push::PlatformError> {
            Err(crate::push::PlatformError::Unsupported)
        }
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
    }

    fn controller() -> (Controller<HttpGateway>, mpsc::Receiver<PlannerMessage>) {
        let (tx, rx) = mpsc::channel(64);
        // Nothing listens on the discard port
        let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_secs(1));
        let controller =
            Controller::new(gateway, Arc::new(NoPush), ControllerConfig::default(), tx)
                .with_clock(sunday);
        (controller, rx)
    }

    fn oats() -> FoodRecord {
        FoodRecord {
            food: "Oats".to_string(),
            calories: 150.0,
            protein: 5.0,
            carbs: 27.0,
            fat: 3.0,
            veg_type: "veg".to_string(),
        }
    }

    #[test]
    fn test_config_from_planner_config() {
        let planner = PlannerConfig {
            auto_login_delay: Duration::from_millis(10),
            ..PlannerConfig::default()
        };
        let config = ControllerConfig::from(&planner);
        assert_eq!(config.auto_login_delay, Duration::from_millis(10));
        assert_eq!(config.push.worker_path, "/sw.js");
    }

    #[tokio::test]
    async fn test_controller_starts_on_home() {
        let (mut controller, mut rx) = controller();
        controller.start().await;

        assert_eq!(controller.state().screen(), Screen::Home);
        assert_eq!(controller.state().current_day(), Weekday::Sunday);
        assert_eq!(
            rx.recv().await.unwrap(),
            PlannerMessage::ScreenChanged {
                screen: Screen::Home
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_login_form_spawns_nothing() {
        let (mut controller, mut rx) = controller();
        controller
            .handle_action(UserAction::SubmitLogin(LoginForm::new("", "")))
            .await;

        assert_eq!(controller.pending_effects(), 0);
        assert_eq!(
            rx.recv().await.unwrap(),
            PlannerMessage::error("Please enter your name and password")
        );
    }

    #[tokio::test]
    async fn test_session_screens_are_refused_without_session() {
        let (mut controller, mut rx) = controller();
        controller.handle_action(UserAction::ChooseLogin).await;
        controller.handle_action(UserAction::NavigateNext).await;
        controller.handle_action(UserAction::NavigateNext).await;

        assert_eq!(controller.state().screen(), Screen::Register);
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        assert!(messages.contains(&PlannerMessage::error("Please login first")));
    }

    #[tokio::test]
    async fn test_toggle_food_twice_is_identity() {
        let (mut controller, _rx) = controller();
        let toggle = UserAction::ToggleFood {
            slot: MealSlot::Morning,
            food: oats(),
        };

        controller.handle_action(toggle.clone()).await;
        assert!(controller
            .state()
            .selected_foods()
            .contains(MealSlot::Morning, "Oats"));

        controller.handle_action(toggle).await;
        assert!(controller.state().selected_foods().is_empty());
        assert_eq!(controller.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_doctor_reminder_requires_session() {
        let (mut controller, mut rx) = controller();
        controller
            .handle_action(UserAction::SetupDoctorReminder)
            .await;

        assert_eq!(
            rx.recv().await.unwrap(),
            PlannerMessage::error("Please login first")
        );
    }

    #[tokio::test]
    async fn test_quit_sends_quit() {
        let (mut controller, mut rx) = controller();
        controller.handle_action(UserAction::Quit).await;
        assert!(matches!(
            rx.recv().await.unwrap(),
            PlannerMessage::Quit { .. }
        ));
    }

    #[test]
    fn test_doctor_request_uses_fixed_type_and_time() {
        let request = doctor_request(UserId(3), "2024-01-10", CheckupFrequency::Quarterly);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["doctor_type"], "General Checkup");
        assert_eq!(json["reminder_time"], "10:00");
        assert_eq!(json["frequency"], "quarterly");
    }
}
