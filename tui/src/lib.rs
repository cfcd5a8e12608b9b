//! Diet Planner TUI - Terminal interface for the diet planner
//!
//! A full-screen client for the planner backend: login, food selection,
//! the weekly plan with its assistant chat, progress dashboards and meal
//! reminders.
//!
//! # Architecture
//!
//! - **Controller client**: embeds the headless planner controller
//! - **Input**: turns key presses into planner actions
//! - **Views**: one draw function per screen
//! - **Platform**: push worker and notification panel for a terminal

pub mod app;
pub mod controller_client;
pub mod display;
pub mod input;
pub mod platform;
pub mod theme;
pub mod views;

pub use app::App;
