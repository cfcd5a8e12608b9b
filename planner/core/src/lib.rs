//! Planner Core - Headless Diet Planner Client
//!
//! This crate holds everything the diet planner client does apart from
//! drawing: the screen state machine, the session and domain caches, the
//! backend gateway, push registration and the push worker. It can drive a
//! TUI, another surface, or run headless under test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surfaces                           │
//! │        ┌──────────────┐            ┌────────────────────┐     │
//! │        │     TUI      │            │  Headless / Tests  │     │
//! │        │  (ratatui)   │            │                    │     │
//! │        └──────┬───────┘            └─────────┬──────────┘     │
//! │               └──────────────┬───────────────┘                │
//! │                       UserAction (up)                         │
//! │                     PlannerMessage (down)                     │
//! └──────────────────────────────┼────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼────────────────────────────────┐
//! │                        PLANNER CORE                           │
//! │  ┌───────────────────────────┴─────────────────────────────┐  │
//! │  │                       Controller                        │  │
//! │  │  ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────┐  │  │
//! │  │  │ AppState │  │  Screen  │  │   Push    │  │ Effect │  │  │
//! │  │  │ (reducer)│  │ machine  │  │ Registrar │  │ tasks  │  │  │
//! │  │  └──────────┘  └──────────┘  └───────────┘  └───┬────┘  │  │
//! │  └─────────────────────────────────────────────────┼───────┘  │
//! │                                                    │          │
//! │  ┌──────────────────┐                 ┌────────────┴───────┐  │
//! │  │  ServiceWorker   │                 │   BackendGateway   │  │
//! │  │  (own task)      │                 │   (HttpGateway)    │  │
//! │  └──────────────────┘                 └────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Controller`]: owns the state, handles actions, runs effects
//! - [`AppState`]: everything the planner knows, read by surfaces
//! - [`UserAction`]: actions sent from UI surfaces to the controller
//! - [`PlannerMessage`]: messages sent from the controller to UI surfaces
//! - [`BackendGateway`]: one async call per backend operation
//! - [`ServiceWorker`]: the push worker, run through a [`WorkerHandle`]
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use planner_core::{Controller, ControllerConfig, HttpGateway, UserAction, load_config};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let gateway = HttpGateway::from_config(&config);
//!     let mut controller =
//!         Controller::new(gateway, platform, ControllerConfig::from(&config), tx);
//!     controller.start().await;
//!
//!     loop {
//!         while let Ok(msg) = rx.try_recv() {
//!             // Show notifications, prompts
//!         }
//!         controller.poll_effects().await;
//!         // Render from controller.state(), send input as UserAction
//!     }
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has no dependency on ratatui, crossterm, or any other UI
//! framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calendar;
pub mod chat;
pub mod config;
pub mod controller;
pub mod domain;
pub mod events;
pub mod gateway;
pub mod messages;
pub mod push;
pub mod screen;
pub mod state;
pub mod worker;

// Re-exports for convenience
pub use chat::{ChatEntry, ChatLog, ChatRole};
pub use controller::{Controller, ControllerConfig, EffectOutcome, LoginOrigin};
pub use domain::{
    AvailableFoods, CheckupFrequency, ConsumptionStatus, DayCompletion, DayCompletionRecord,
    DietPreference, FoodRecord, HealthCondition, HealthDashboard, MealRecord, MealSlot,
    SelectedFoods, Session, UserId, WeeklyDashboard, WeeklyMealPlan, Weekday,
};
pub use events::{FormError, LoginForm, RegistrationForm, UserAction};
pub use gateway::{BackendGateway, GatewayError, HttpGateway, Operation};
pub use messages::{NotifyLevel, PlannerMessage};
pub use push::{Permission, PlatformError, PushPlatform, PushRegistrar, RegistrationReport};
pub use screen::{Refresh, Screen, Trigger};
pub use state::{AppState, Confirmation, DoctorForm, StateChange};
pub use worker::{ServiceWorker, WorkerEvent, WorkerHandle, WorkerHost, WorkerState};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, PlannerConfig, PushSettings,
};
