//! Reminders, weekly progress and the health dashboard

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Gauge, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use super::{panel, ratio, ViewContext};
use crate::theme::{self, DIM_GRAY, INFO_CYAN, LINK_BLUE, PLANNER_GREEN, SUCCESS_GREEN};

// ============================================================================
// Smart Reminders
// ============================================================================

pub(super) fn draw_reminders(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(5)])
        .split(columns[0]);

    draw_reminder_actions(frame, left[0], ctx);
    draw_doctor_form(frame, left[1], ctx);
    draw_panel(frame, columns[1], ctx);
}

fn draw_reminder_actions(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let active = ctx.state.active_reminders();
    let text = vec![
        Line::from(Span::styled(
            format!("{active} reminder(s) active"),
            Style::default()
                .fg(if active > 0 { SUCCESS_GREEN } else { DIM_GRAY })
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled("[e] Enable meal reminders", theme::focused())),
        Line::from("[t] Send a test notification"),
        Line::from("[a] Trigger all reminders now"),
        Line::from("[k] Check due reminders"),
    ];
    frame.render_widget(Paragraph::new(text).block(panel("Smart Reminders")), area);
}

fn draw_doctor_form(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let form = ctx.state.doctor_form();

    let date_line = if ctx.input.date_focused() {
        Line::from(vec![
            Span::styled("> Last visit  ", theme::focused()),
            Span::raw(format!("{}_", ctx.input.visit_date())),
        ])
    } else {
        Line::from(vec![
            Span::raw("  Last visit  "),
            Span::raw(form.last_visit_date.as_deref().unwrap_or("not set").to_string()),
        ])
    };

    let text = vec![
        date_line,
        Line::from(format!("  Frequency   < {} >", form.frequency.key())),
        Line::default(),
        Line::from(Span::styled(
            "[d] Edit date  [f] Frequency  [s] Save reminder",
            Style::default().fg(LINK_BLUE),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(panel("Doctor Checkup")),
        area,
    );
}

fn draw_panel(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let shown = ctx.panel.shown();
    if shown.is_empty() {
        frame.render_widget(
            Paragraph::new("No notifications")
                .style(theme::hint())
                .block(panel("Notifications")),
            rows[0],
        );
    } else {
        let mut lines = Vec::new();
        for notification in shown.iter().rev() {
            lines.push(Line::from(Span::styled(
                notification.title.clone(),
                Style::default()
                    .fg(PLANNER_GREEN)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(notification.body.clone()));
            let buttons: Vec<String> = notification
                .actions
                .iter()
                .map(|action| action.title().to_string())
                .collect();
            if !buttons.is_empty() {
                lines.push(Line::from(Span::styled(
                    buttons.join(" | "),
                    theme::hint(),
                )));
            }
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "[o] Open  [m] Mark consumed  [z] Snooze  [w] Dismiss",
            Style::default().fg(LINK_BLUE),
        )));
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(panel("Notifications")),
            rows[0],
        );
    }

    let activity: Vec<ListItem> = ctx
        .panel
        .activity()
        .into_iter()
        .rev()
        .map(|line| ListItem::new(line).style(Style::default().fg(INFO_CYAN)))
        .collect();
    frame.render_widget(List::new(activity).block(panel("Reminder Activity")), rows[1]);
}

// ============================================================================
// Weekly Progress
// ============================================================================

pub(super) fn draw_weekly_progress(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let Some(dashboard) = ctx.state.weekly_dashboard() else {
        frame.render_widget(
            Paragraph::new("No progress recorded this week.")
                .style(theme::hint())
                .block(panel("Weekly Progress")),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    frame.render_widget(
        Gauge::default()
            .block(panel("Meals eaten"))
            .gauge_style(Style::default().fg(SUCCESS_GREEN))
            .ratio(ratio(dashboard.goal_percentage))
            .label(format!(
                "{}/{} meals ({:.0}%)",
                dashboard.total_meals_consumed,
                dashboard.total_possible_meals,
                dashboard.goal_percentage
            )),
        rows[0],
    );

    frame.render_widget(
        Gauge::default()
            .block(panel("Calories"))
            .gauge_style(Style::default().fg(theme::AFTERNOON_CORAL))
            .ratio(ratio(dashboard.calorie_percentage))
            .label(format!(
                "{:.0} / {:.0} kcal",
                dashboard.total_calories_consumed, dashboard.target_calories
            )),
        rows[1],
    );

    let days: Vec<ListItem> = dashboard
        .daily_breakdown
        .iter()
        .map(|(day, breakdown)| {
            let (mark, color) = if breakdown.is_complete {
                ("done", SUCCESS_GREEN)
            } else {
                ("    ", DIM_GRAY)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(color)),
                Span::raw(format!(
                    "{:<10} {}  {}/{} meals  {:.0} kcal",
                    day.name(),
                    breakdown.date,
                    breakdown.meals_consumed,
                    breakdown.total_meals,
                    breakdown.calories
                )),
            ]))
        })
        .collect();
    frame.render_widget(List::new(days).block(panel("Daily Breakdown")), rows[2]);
}

// ============================================================================
// Health Dashboard
// ============================================================================

pub(super) fn draw_health_dashboard(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let Some(health) = ctx.state.health_dashboard() else {
        frame.render_widget(
            Paragraph::new("Health data is not available yet.")
                .style(theme::hint())
                .block(panel("Health Dashboard")),
            area,
        );
        return;
    };
    let weekly = &health.weekly;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);

    let stats = vec![
        Line::from(format!(
            "Meal completion: {:.0}%  ({}/{} meals)",
            weekly.meal_completion_percentage, weekly.meals_consumed, weekly.total_possible_meals
        )),
        Line::from(format!(
            "Calories eaten:  {:.0} of {:.0} planned",
            weekly.total_calories, weekly.total_planned_calories
        )),
    ];
    frame.render_widget(
        Paragraph::new(stats).block(panel("This Week")),
        rows[0],
    );

    let bars: Vec<(&str, u64)> = weekly
        .chart_data
        .iter()
        .map(|point| {
            (
                point.day.as_str(),
                point.completion_percentage.clamp(0.0, 100.0).round() as u64,
            )
        })
        .collect();
    frame.render_widget(
        BarChart::default()
            .block(panel("Daily completion %"))
            .data(bars.as_slice())
            .bar_width(5)
            .bar_gap(2)
            .max(100)
            .bar_style(Style::default().fg(PLANNER_GREEN))
            .value_style(Style::default().add_modifier(Modifier::REVERSED)),
        rows[1],
    );
}
