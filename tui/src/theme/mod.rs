//! Theme and Colors
//!
//! The planner's palette: a fresh green accent for the brand, one colour per
//! meal slot, and the usual success/error/info trio for notifications.

use ratatui::style::{Color, Modifier, Style};

use planner_core::{MealSlot, NotifyLevel};

// ============================================================================
// Brand
// ============================================================================

/// Accent for titles and the focused element
pub const PLANNER_GREEN: Color = Color::Rgb(96, 200, 120);

/// Secondary accent for links and key hints
pub const LINK_BLUE: Color = Color::Rgb(110, 170, 255);

/// Dim text, borders and hints
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);

// ============================================================================
// Meal Slots
// ============================================================================

/// Breakfast
pub const MORNING_GOLD: Color = Color::Rgb(255, 200, 90);

/// Lunch
pub const AFTERNOON_CORAL: Color = Color::Rgb(255, 140, 110);

/// Dinner
pub const DINNER_VIOLET: Color = Color::Rgb(170, 140, 255);

// ============================================================================
// Feedback
// ============================================================================

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Info / progress
pub const INFO_CYAN: Color = Color::Rgb(120, 210, 230);

/// Colour for a meal slot
pub fn slot_color(slot: MealSlot) -> Color {
    match slot {
        MealSlot::Morning => MORNING_GOLD,
        MealSlot::Afternoon => AFTERNOON_CORAL,
        MealSlot::Dinner => DINNER_VIOLET,
    }
}

/// Colour for a notification level
pub fn level_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Success => SUCCESS_GREEN,
        NotifyLevel::Error => ERROR_RED,
        NotifyLevel::Info => INFO_CYAN,
    }
}

/// Style of the focused field or list row
pub fn focused() -> Style {
    Style::default()
        .fg(PLANNER_GREEN)
        .add_modifier(Modifier::BOLD)
}

/// Style of key hints
pub fn hint() -> Style {
    Style::default().fg(DIM_GRAY)
}
