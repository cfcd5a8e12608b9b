//! Dashboard, food selection and the weekly plan with its chat panel

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use planner_core::{calendar, AppState, ChatRole, MealSlot, Weekday};

use super::{panel, ViewContext};
use crate::theme::{self, DIM_GRAY, PLANNER_GREEN, SUCCESS_GREEN};

/// Date key of a plan day, anchored to the plan's week
fn plan_date(state: &AppState, day: Weekday) -> String {
    let week_start = state
        .plan_week_start()
        .unwrap_or_else(|| calendar::week_start(calendar::local_today()));
    calendar::date_key(calendar::date_for_day(day, week_start))
}

// ============================================================================
// Dashboard
// ============================================================================

pub(super) fn draw_dashboard(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let state = ctx.state;
    let name = ctx.display.user_name().unwrap_or("there");

    let mut text = vec![
        Line::from(Span::styled(
            format!("Welcome, {name}!"),
            Style::default()
                .fg(PLANNER_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    let (plan_line, create_label) = if state.meal_plan().is_some() {
        ("You have a meal plan for this week.", "[c] Create a new meal plan")
    } else {
        ("You don't have a meal plan yet.", "[c] Create meal plan")
    };
    text.push(Line::from(plan_line));
    text.push(Line::default());
    text.push(Line::from(Span::styled(create_label, theme::focused())));
    text.push(Line::from(Span::styled(
        format!(
            "[r] Smart reminders ({} active)",
            state.active_reminders()
        ),
        Style::default().fg(theme::LINK_BLUE),
    )));

    if let Some(dashboard) = state.weekly_dashboard() {
        text.push(Line::default());
        text.push(Line::from(format!(
            "This week: {}/{} meals, {:.0} kcal ({:.0}% of goal)",
            dashboard.total_meals_consumed,
            dashboard.total_possible_meals,
            dashboard.total_calories_consumed,
            dashboard.goal_percentage
        )));
    }

    frame.render_widget(Paragraph::new(text).block(panel("Dashboard")), area);
}

// ============================================================================
// Food Selection
// ============================================================================

fn slot_tabs(active: MealSlot) -> Tabs<'static> {
    let titles: Vec<Line> = MealSlot::ALL
        .iter()
        .map(|slot| {
            Line::from(Span::styled(
                slot.label(),
                Style::default().fg(theme::slot_color(*slot)),
            ))
        })
        .collect();
    let selected = MealSlot::ALL
        .iter()
        .position(|slot| *slot == active)
        .unwrap_or(0);

    Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
}

pub(super) fn draw_food_selection(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let state = ctx.state;
    let slot = ctx.input.food_slot();
    let selected = state.selected_foods();

    let block = panel("Select Your Foods");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(slot_tabs(slot), rows[0]);

    let foods = state.available_foods().for_slot(slot);
    if foods.is_empty() {
        frame.render_widget(
            Paragraph::new("No foods available for this meal.").style(theme::hint()),
            rows[1],
        );
    } else {
        let items: Vec<ListItem> = foods
            .iter()
            .map(|food| {
                let mark = if selected.contains(slot, &food.food) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let veg = if food.is_non_veg() { "non-veg" } else { "veg" };
                ListItem::new(format!(
                    "{mark} {:<24} {:>5.0} kcal  P{:.0} C{:.0} F{:.0}  {veg}",
                    food.food, food.calories, food.protein, food.carbs, food.fat
                ))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(ctx.input.food_cursor()));
        frame.render_stateful_widget(
            List::new(items).highlight_style(theme::focused()),
            rows[1],
            &mut list_state,
        );
    }

    let counts: Vec<String> = MealSlot::ALL
        .iter()
        .map(|s| format!("{} {}", s.label(), selected.for_slot(*s).len()))
        .collect();
    frame.render_widget(
        Paragraph::new(format!(
            "Selected: {}  |  [g] Generate plan",
            counts.join(", ")
        ))
        .style(theme::hint()),
        rows[2],
    );
}

// ============================================================================
// Weekly Plan
// ============================================================================

pub(super) fn draw_weekly_plan(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_plan_days(frame, columns[0], ctx);
    draw_chat(frame, columns[1], ctx);
}

fn draw_plan_days(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let state = ctx.state;
    let block = panel("Weekly Meal Plan");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(plan) = state.meal_plan() else {
        frame.render_widget(
            Paragraph::new(vec![
                Line::from("No meal plan yet."),
                Line::default(),
                Line::from(Span::styled("[f] Choose foods", theme::focused())),
            ]),
            inner,
        );
        return;
    };

    let day = state.current_day();
    let date = plan_date(state, day);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let day_titles: Vec<Line> = Weekday::ALL
        .iter()
        .map(|d| {
            let complete = state.day_completion().is_complete(&plan_date(state, *d));
            let style = if complete {
                Style::default().fg(SUCCESS_GREEN)
            } else {
                Style::default()
            };
            Line::from(Span::styled(d.short(), style))
        })
        .collect();
    let selected_tab = Weekday::ALL.iter().position(|d| *d == day).unwrap_or(0);
    frame.render_widget(
        Tabs::new(day_titles)
            .select(selected_tab)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        rows[0],
    );

    let mut lines = Vec::new();
    for slot in MealSlot::ALL {
        let consumed = state.consumption().is_consumed(&date, slot);
        let focused = slot == ctx.input.plan_slot();
        let status = if consumed { "eaten" } else { "not eaten" };
        let header_style = if focused {
            theme::focused()
        } else {
            Style::default().fg(theme::slot_color(slot))
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {}", if focused { ">" } else { " " }, slot.label()),
                header_style,
            ),
            Span::styled(
                format!("  [{status}]"),
                Style::default().fg(if consumed { SUCCESS_GREEN } else { DIM_GRAY }),
            ),
        ]));

        let meals = plan.meals(day, slot);
        if meals.is_empty() {
            lines.push(Line::from(Span::styled("    nothing planned", theme::hint())));
        }
        for meal in meals {
            let pick = if meal.is_user_selected { "  (your pick)" } else { "" };
            lines.push(Line::from(format!(
                "    {} - {:.0} kcal{pick}",
                meal.food, meal.calories
            )));
        }
        lines.push(Line::default());
    }

    let totals = plan.day_totals(day);
    lines.push(Line::from(Span::styled(
        format!(
            "{} {date}: {:.0} kcal | protein {:.0}g | carbs {:.0}g | fat {:.0}g",
            day.name(),
            totals.calories,
            totals.protein,
            totals.carbs,
            totals.fat
        ),
        theme::hint(),
    )));
    if let Some(record) = state.day_completion().get(&date) {
        lines.push(Line::from(Span::styled(
            format!(
                "{}/{} meals eaten{}",
                record.consumed_meals,
                record.total_foods,
                if record.is_complete { ", day complete!" } else { "" }
            ),
            Style::default().fg(if record.is_complete {
                SUCCESS_GREEN
            } else {
                DIM_GRAY
            }),
        )));
    }

    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn draw_chat(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let state = ctx.state;
    let block = panel("Ask about your plan");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let width = rows[0].width.saturating_sub(1).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for entry in state.chat().entries() {
        let (prefix, style) = match entry.role {
            ChatRole::User => ("You: ", Style::default().fg(PLANNER_GREEN)),
            ChatRole::Bot => ("Planner: ", Style::default().fg(theme::LINK_BLUE)),
        };
        for line in textwrap::wrap(&format!("{prefix}{}", entry.message), width) {
            lines.push(Line::from(Span::styled(line.into_owned(), style)));
        }
        lines.push(Line::default());
    }
    if state.chat_loading() {
        lines.push(Line::from(Span::styled("Planner is typing...", theme::hint())));
    }

    // Keep the newest lines in view
    let height = rows[0].height as usize;
    let skip = lines.len().saturating_sub(height);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(visible), rows[0]);

    let prompt = if ctx.input.chat_focused() {
        Line::from(Span::styled(
            format!("> {}_", ctx.input.chat_draft()),
            theme::focused(),
        ))
    } else {
        Line::from(Span::styled("[/] Ask a question", theme::hint()))
    };
    frame.render_widget(Paragraph::new(prompt).wrap(Wrap { trim: false }), rows[1]);
}
