//! Application State
//!
//! Everything the planner knows, in one value, changed only through
//! [`AppState::apply`]. Surfaces render from `&AppState`; the controller is
//! the only writer.
//!
//! # Invariants
//!
//! - Session-scoped data (selections, plan, consumption caches, chat,
//!   reminder count) is cleared together when the session ends.
//! - The current screen only requires a session while one exists.

use chrono::NaiveDate;

use crate::chat::{ChatEntry, ChatLog};
use crate::domain::{
    AvailableFoods, CheckupFrequency, ConsumptionStatus, DayCompletion, FoodRecord,
    HealthDashboard, MealSlot, SelectedFoods, Session, WeeklyDashboard, WeeklyMealPlan, Weekday,
};
use crate::screen::Screen;

/// A yes/no question waiting on the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Throw away the current plan and consumption history
    Regenerate {
        /// Screen the request came from
        origin: Screen,
    },
}

impl Confirmation {
    /// Question shown to the user
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Regenerate {
                origin: Screen::Dashboard,
            } => {
                "You already have a meal plan. Do you want to create a new one? This will clear your current plan and consumption history."
            }
            Self::Regenerate { .. } => {
                "Are you sure you want to regenerate your meal plan? This will clear your current plan and consumption history, and you'll need to select foods again."
            }
        }
    }
}

/// Doctor checkup reminder form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoctorForm {
    /// Last checkup, `YYYY-MM-DD`
    pub last_visit_date: Option<String>,
    /// How often checkups happen
    pub frequency: CheckupFrequency,
}

/// A named state change
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Login or auto-login produced a session
    SessionStarted(Session),
    /// Session ended; drops every session-scoped value
    SessionEnded,
    /// Screen changed
    ScreenEntered(Screen),
    /// Food toggled in a slot
    FoodToggled {
        /// Slot
        slot: MealSlot,
        /// Food
        food: FoodRecord,
    },
    /// Candidate foods refreshed
    AvailableFoodsLoaded(AvailableFoods),
    /// A plan was generated or loaded
    PlanLoaded {
        /// The plan
        plan: WeeklyMealPlan,
        /// Sunday of the week the plan covers
        week_start: NaiveDate,
    },
    /// Plan and selections dropped ahead of regeneration
    PlanCleared,
    /// Consumption flags refreshed
    ConsumptionLoaded(ConsumptionStatus),
    /// Day completion refreshed
    DayCompletionLoaded(DayCompletion),
    /// Weekly dashboard refreshed
    WeeklyDashboardLoaded(WeeklyDashboard),
    /// Health dashboard refreshed
    HealthDashboardLoaded(HealthDashboard),
    /// Consumption flags, day completion and the weekly dashboard dropped
    ConsumptionCleared,
    /// Day tab changed
    DaySelected(Weekday),
    /// Chat entry appended
    ChatAppended(ChatEntry),
    /// Chat request started or finished
    ChatLoading(bool),
    /// Reminder setup reported a count
    RemindersActivated(u32),
    /// Confirmation prompt raised
    ConfirmationRequested(Confirmation),
    /// Confirmation prompt answered or dismissed
    ConfirmationCleared,
    /// Doctor form edited
    DoctorFormUpdated(DoctorForm),
    /// Doctor form back to defaults
    DoctorFormReset,
}

/// Whole-application state
#[derive(Clone, Debug)]
pub struct AppState {
    screen: Screen,
    session: Option<Session>,
    selected_foods: SelectedFoods,
    available_foods: AvailableFoods,
    meal_plan: Option<WeeklyMealPlan>,
    plan_week_start: Option<NaiveDate>,
    consumption: ConsumptionStatus,
    day_completion: DayCompletion,
    weekly_dashboard: Option<WeeklyDashboard>,
    health_dashboard: Option<HealthDashboard>,
    current_day: Weekday,
    chat: ChatLog,
    chat_loading: bool,
    active_reminders: u32,
    pending_confirmation: Option<Confirmation>,
    doctor_form: DoctorForm,
}

impl AppState {
    /// Fresh state on the home screen, with `today` preselected on the plan
    #[must_use]
    pub fn new(today: Weekday) -> Self {
        Self {
            screen: Screen::Home,
            session: None,
            selected_foods: SelectedFoods::new(),
            available_foods: AvailableFoods::default(),
            meal_plan: None,
            plan_week_start: None,
            consumption: ConsumptionStatus::default(),
            day_completion: DayCompletion::default(),
            weekly_dashboard: None,
            health_dashboard: None,
            current_day: today,
            chat: ChatLog::new(),
            chat_loading: false,
            active_reminders: 0,
            pending_confirmation: None,
            doctor_form: DoctorForm::default(),
        }
    }

    /// Apply one change
    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::SessionStarted(session) => {
                self.session = Some(session);
            }
            StateChange::SessionEnded => {
                let today = self.current_day;
                *self = Self::new(today);
            }
            StateChange::ScreenEntered(screen) => {
                self.screen = screen;
            }
            StateChange::FoodToggled { slot, food } => {
                self.selected_foods.toggle(slot, food);
            }
            StateChange::AvailableFoodsLoaded(foods) => {
                self.available_foods = foods;
            }
            StateChange::PlanLoaded { plan, week_start } => {
                self.meal_plan = Some(plan);
                self.plan_week_start = Some(week_start);
            }
            StateChange::PlanCleared => {
                self.meal_plan = None;
                self.plan_week_start = None;
                self.selected_foods = SelectedFoods::new();
            }
            StateChange::ConsumptionLoaded(status) => {
                self.consumption = status;
            }
            StateChange::DayCompletionLoaded(completion) => {
                self.day_completion = completion;
            }
            StateChange::WeeklyDashboardLoaded(dashboard) => {
                self.weekly_dashboard = Some(dashboard);
            }
            StateChange::HealthDashboardLoaded(dashboard) => {
                self.health_dashboard = Some(dashboard);
            }
            StateChange::ConsumptionCleared => {
                self.consumption = ConsumptionStatus::default();
                self.day_completion = DayCompletion::default();
                self.weekly_dashboard = None;
            }
            StateChange::DaySelected(day) => {
                self.current_day = day;
            }
            StateChange::ChatAppended(entry) => {
                self.chat.push(entry);
            }
            StateChange::ChatLoading(loading) => {
                self.chat_loading = loading;
            }
            StateChange::RemindersActivated(count) => {
                self.active_reminders = count;
            }
            StateChange::ConfirmationRequested(confirmation) => {
                self.pending_confirmation = Some(confirmation);
            }
            StateChange::ConfirmationCleared => {
                self.pending_confirmation = None;
            }
            StateChange::DoctorFormUpdated(form) => {
                self.doctor_form = form;
            }
            StateChange::DoctorFormReset => {
                self.doctor_form = DoctorForm::default();
            }
        }
    }

    /// Current screen
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Current session
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Foods picked so far
    #[must_use]
    pub fn selected_foods(&self) -> &SelectedFoods {
        &self.selected_foods
    }

    /// Candidate foods
    #[must_use]
    pub fn available_foods(&self) -> &AvailableFoods {
        &self.available_foods
    }

    /// The plan, once generated or loaded
    #[must_use]
    pub fn meal_plan(&self) -> Option<&WeeklyMealPlan> {
        self.meal_plan.as_ref()
    }

    /// Sunday of the plan's week
    #[must_use]
    pub fn plan_week_start(&self) -> Option<NaiveDate> {
        self.plan_week_start
    }

    /// Consumed flags
    #[must_use]
    pub fn consumption(&self) -> &ConsumptionStatus {
        &self.consumption
    }

    /// Per-date completion
    #[must_use]
    pub fn day_completion(&self) -> &DayCompletion {
        &self.day_completion
    }

    /// Weekly aggregate, once fetched
    #[must_use]
    pub fn weekly_dashboard(&self) -> Option<&WeeklyDashboard> {
        self.weekly_dashboard.as_ref()
    }

    /// Health aggregate, once fetched
    #[must_use]
    pub fn health_dashboard(&self) -> Option<&HealthDashboard> {
        self.health_dashboard.as_ref()
    }

    /// Day tab on the weekly plan
    #[must_use]
    pub fn current_day(&self) -> Weekday {
        self.current_day
    }

    /// Chat transcript
    #[must_use]
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// A chat request is in flight
    #[must_use]
    pub fn chat_loading(&self) -> bool {
        self.chat_loading
    }

    /// Reminders set up by the backend
    #[must_use]
    pub fn active_reminders(&self) -> u32 {
        self.active_reminders
    }

    /// Question awaiting an answer
    #[must_use]
    pub fn pending_confirmation(&self) -> Option<Confirmation> {
        self.pending_confirmation
    }

    /// Doctor form contents
    #[must_use]
    pub fn doctor_form(&self) -> &DoctorForm {
        &self.doctor_form
    }
}
