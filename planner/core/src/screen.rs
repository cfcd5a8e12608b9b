//! Screens and Navigation
//!
//! The closed set of screens, the transition table between them, and the
//! cache refreshes each screen fires when it is entered.
//!
//! # Design Philosophy
//!
//! Transitions are data, not scattered assignments: [`transition`] matches
//! every [`Trigger`] exhaustively, so adding a trigger without deciding where
//! it may fire is a compile error. Entry effects hang off the target screen,
//! so every path into a screen refreshes the same caches.

use serde::{Deserialize, Serialize};

/// The screen currently shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// Landing menu
    #[default]
    Home,
    /// Login form
    Login,
    /// Registration form
    Register,
    /// Post-login hub
    Dashboard,
    /// Per-slot food picker
    FoodSelection,
    /// Generated week with consumption tracking and chat
    WeeklyPlan,
    /// Push reminders and doctor checkups
    SmartReminders,
    /// Weekly progress summary
    WeeklyProgress,
    /// Health dashboard
    HealthDashboard,
}

impl Screen {
    /// Every screen
    pub const ALL: [Screen; 9] = [
        Screen::Home,
        Screen::Login,
        Screen::Register,
        Screen::Dashboard,
        Screen::FoodSelection,
        Screen::WeeklyPlan,
        Screen::SmartReminders,
        Screen::WeeklyProgress,
        Screen::HealthDashboard,
    ];

    /// Stable key (`foodSelection`, `weeklyPlan`, ...)
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::Dashboard => "dashboard",
            Self::FoodSelection => "foodSelection",
            Self::WeeklyPlan => "weeklyPlan",
            Self::SmartReminders => "smartReminders",
            Self::WeeklyProgress => "weeklyProgress",
            Self::HealthDashboard => "healthDashboard",
        }
    }

    /// Title shown in the header
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Diet Planner",
            Self::Login => "Login",
            Self::Register => "Create Account",
            Self::Dashboard => "Dashboard",
            Self::FoodSelection => "Select Your Foods",
            Self::WeeklyPlan => "Weekly Meal Plan",
            Self::SmartReminders => "Smart Reminders",
            Self::WeeklyProgress => "Weekly Progress",
            Self::HealthDashboard => "Health Dashboard",
        }
    }

    /// Whether this screen can only be shown with a session
    #[must_use]
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Home | Self::Login | Self::Register)
    }

    /// Caches refreshed every time this screen is entered
    #[must_use]
    pub fn entry_effects(&self) -> &'static [Refresh] {
        match self {
            Self::FoodSelection => &[Refresh::AvailableFoods],
            Self::WeeklyPlan => &[
                Refresh::ConsumptionStatus,
                Refresh::DayCompletion,
                Refresh::WeeklyDashboard,
            ],
            Self::WeeklyProgress => &[
                Refresh::HealthDashboard,
                Refresh::ConsumptionStatus,
                Refresh::DayCompletion,
            ],
            Self::HealthDashboard => &[
                Refresh::HealthDashboard,
                Refresh::WeeklyDashboard,
                Refresh::ConsumptionStatus,
                Refresh::DayCompletion,
            ],
            Self::Home
            | Self::Login
            | Self::Register
            | Self::Dashboard
            | Self::SmartReminders => &[],
        }
    }

    /// Back/next arrow targets
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        let (back, next) = match self {
            Self::Home => (None, None),
            Self::Login => (Some(Self::Home), Some(Self::Register)),
            Self::Register => (Some(Self::Login), Some(Self::Dashboard)),
            Self::Dashboard => (Some(Self::Register), Some(Self::FoodSelection)),
            Self::FoodSelection => (Some(Self::Dashboard), Some(Self::SmartReminders)),
            Self::SmartReminders => (Some(Self::FoodSelection), Some(Self::WeeklyPlan)),
            Self::WeeklyPlan => (Some(Self::SmartReminders), Some(Self::WeeklyProgress)),
            Self::WeeklyProgress => (Some(Self::WeeklyPlan), None),
            Self::HealthDashboard => (Some(Self::WeeklyProgress), None),
        };
        Navigation { back, next }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Arrow targets for a screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// Left arrow
    pub back: Option<Screen>,
    /// Right arrow
    pub next: Option<Screen>,
}

/// A cache refreshed from the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Refresh {
    /// Candidate foods per slot
    AvailableFoods,
    /// Per-date consumed flags
    ConsumptionStatus,
    /// Per-date completion
    DayCompletion,
    /// Weekly aggregate
    WeeklyDashboard,
    /// Health aggregate
    HealthDashboard,
}

impl Refresh {
    /// Failures of this refresh are logged without telling the user
    #[must_use]
    pub fn is_silent(&self) -> bool {
        !matches!(self, Self::AvailableFoods | Self::HealthDashboard)
    }
}

/// Why the screen is changing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// "Register" chosen on home or the login link
    ChooseRegister,
    /// "Login" chosen on home or the register link
    ChooseLogin,
    /// Login answered with a user id
    LoggedIn {
        /// Saved plan is active and from this week
        resume_plan: bool,
    },
    /// Auto-login after registration finished
    AutoLogin {
        /// Whether it produced a session
        succeeded: bool,
    },
    /// "Generate plan" on a dashboard without a plan
    StartPlanning,
    /// Regenerate confirmed and consumption cleared
    RegenerateConfirmed,
    /// Weekly plan shown without a plan to show
    ChooseFoods,
    /// Backend returned a plan
    PlanGenerated,
    /// "View progress" on the weekly plan
    ViewProgress,
    /// "Smart reminders" on the dashboard
    OpenReminders,
    /// "Health dashboard" on weekly progress
    OpenHealthDashboard,
    /// "Back to plan" on weekly progress
    BackToPlan,
    /// "Back to dashboard" on the health dashboard
    BackToDashboard,
    /// Logout, from anywhere
    Logout,
    /// Left arrow
    NavigateBack,
    /// Right arrow
    NavigateNext,
}

/// Where `trigger` leads from `from`, or `None` if it cannot fire there
#[must_use]
pub fn transition(from: Screen, trigger: Trigger) -> Option<Screen> {
    use Screen::{
        Dashboard, FoodSelection, HealthDashboard, Home, Login, Register, SmartReminders,
        WeeklyPlan, WeeklyProgress,
    };

    match trigger {
        Trigger::ChooseRegister => matches!(from, Home | Login).then_some(Register),
        Trigger::ChooseLogin => matches!(from, Home | Register).then_some(Login),
        // Login answers may land after the user left the form
        Trigger::LoggedIn { resume_plan } => {
            (!from.requires_session()).then_some(if resume_plan { WeeklyPlan } else { Dashboard })
        }
        Trigger::AutoLogin { succeeded } => {
            (!from.requires_session()).then_some(if succeeded { Dashboard } else { Login })
        }
        Trigger::StartPlanning => (from == Dashboard).then_some(FoodSelection),
        Trigger::OpenReminders => (from == Dashboard).then_some(SmartReminders),
        Trigger::RegenerateConfirmed => {
            matches!(from, Dashboard | WeeklyPlan).then_some(FoodSelection)
        }
        Trigger::ChooseFoods => (from == WeeklyPlan).then_some(FoodSelection),
        Trigger::PlanGenerated => (from == FoodSelection).then_some(WeeklyPlan),
        Trigger::ViewProgress => (from == WeeklyPlan).then_some(WeeklyProgress),
        Trigger::OpenHealthDashboard => (from == WeeklyProgress).then_some(HealthDashboard),
        Trigger::BackToPlan => (from == WeeklyProgress).then_some(WeeklyPlan),
        Trigger::BackToDashboard => (from == HealthDashboard).then_some(Dashboard),
        Trigger::Logout => Some(Home),
        Trigger::NavigateBack => from.navigation().back,
        Trigger::NavigateNext => from.navigation().next,
    }
}
