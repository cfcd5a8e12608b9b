//! Screen Rendering
//!
//! One draw function per screen, plus the frame around them: header,
//! toast line, key hints and the confirmation dialog.
//!
//! Everything here is a pure function of [`ViewContext`]; nothing is
//! mutated while drawing.

mod plan;
mod progress;
mod session;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use planner_core::{AppState, Screen};

use crate::display::DisplayState;
use crate::input::InputState;
use crate::platform::NotificationPanel;
use crate::theme::{self, DIM_GRAY, PLANNER_GREEN};

/// Everything a frame is drawn from
pub struct ViewContext<'a> {
    /// Planner state
    pub state: &'a AppState,
    /// Toast, prompt and session as announced
    pub display: &'a DisplayState,
    /// Forms and cursors
    pub input: &'a InputState,
    /// Worker notifications
    pub panel: &'a NotificationPanel,
    /// A backend call is running
    pub busy: bool,
}

/// Draw one frame
pub fn draw(frame: &mut Frame, ctx: &ViewContext) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, rows[0], ctx);

    let body = rows[1];
    match ctx.state.screen() {
        Screen::Home => session::draw_home(frame, body),
        Screen::Login => session::draw_login(frame, body, ctx),
        Screen::Register => session::draw_register(frame, body, ctx),
        Screen::Dashboard => plan::draw_dashboard(frame, body, ctx),
        Screen::FoodSelection => plan::draw_food_selection(frame, body, ctx),
        Screen::WeeklyPlan => plan::draw_weekly_plan(frame, body, ctx),
        Screen::SmartReminders => progress::draw_reminders(frame, body, ctx),
        Screen::WeeklyProgress => progress::draw_weekly_progress(frame, body, ctx),
        Screen::HealthDashboard => progress::draw_health_dashboard(frame, body, ctx),
    }

    draw_toast(frame, rows[2], ctx.display);
    draw_hints(frame, rows[3], ctx);

    if let Some(confirmation) = ctx.state.pending_confirmation() {
        let prompt = ctx
            .display
            .prompt
            .as_deref()
            .unwrap_or_else(|| confirmation.prompt());
        draw_confirm(frame, body, prompt);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let mut spans = vec![
        Span::styled(
            " Diet Planner ",
            Style::default()
                .fg(PLANNER_GREEN)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", theme::hint()),
        Span::raw(ctx.state.screen().title()),
    ];
    if let Some(name) = ctx.display.user_name() {
        spans.push(Span::styled(format!("  ({name})"), theme::hint()));
    }
    if ctx.busy {
        spans.push(Span::styled("  ...", Style::default().fg(theme::INFO_CYAN)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast(frame: &mut Frame, area: Rect, display: &DisplayState) {
    let Some(toast) = display.notification.as_ref() else {
        return;
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", toast.icon()),
            Style::default()
                .fg(theme::level_color(toast.level))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            toast.message.as_str(),
            Style::default().fg(theme::level_color(toast.level)),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_hints(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let text = if ctx.state.pending_confirmation().is_some() {
        "y yes | n no"
    } else {
        hints_for(ctx.state.screen(), ctx.input)
    };
    frame.render_widget(
        Paragraph::new(format!(" {text} | PgUp/PgDn back/next | Ctrl+C quit"))
            .style(theme::hint()),
        area,
    );
}

/// Key hints for the status line
pub fn hints_for(screen: Screen, input: &InputState) -> &'static str {
    match screen {
        Screen::Home => "l login | r register | q quit",
        Screen::Login => "Tab next field | Enter login | Ctrl+R register | Esc back",
        Screen::Register => "Tab next field | </> choose | Enter register | Ctrl+L login",
        Screen::Dashboard => "c create plan | r reminders | x logout",
        Screen::FoodSelection => "Tab slot | Up/Down move | Space select | g generate",
        Screen::WeeklyPlan if input.chat_focused() => "Enter send | Esc leave chat",
        Screen::WeeklyPlan => {
            "</> day | Up/Down meal | Space eaten | / chat | r regenerate | v progress"
        }
        Screen::SmartReminders if input.date_focused() => "YYYY-MM-DD | Enter save | Esc cancel",
        Screen::SmartReminders => "e enable | t test | a trigger all | k check | d date | f freq | s save",
        Screen::WeeklyProgress => "h health dashboard | b back to plan | x logout",
        Screen::HealthDashboard => "b back to dashboard | x logout",
    }
}

fn draw_confirm(frame: &mut Frame, area: Rect, prompt: &str) {
    let popup = centered(area, 60, 9);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(prompt),
        Line::default(),
        Line::from(vec![
            Span::styled("[y] Yes", theme::focused()),
            Span::raw("    "),
            Span::styled("[n] No", Style::default().fg(theme::ERROR_RED)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(panel("Please confirm")),
        popup,
    );
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Bordered block with a title
pub(crate) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_GRAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(PLANNER_GREEN),
        ))
}

/// A `width` x `height` rectangle centred in `area`, clipped to it
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Percentage as a gauge ratio, tolerating junk from the backend
pub(crate) fn ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
