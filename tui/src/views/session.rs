//! Home, login and registration screens

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::{centered, panel, ViewContext};
use crate::input::RegisterField;
use crate::theme::{self, LINK_BLUE, PLANNER_GREEN};

pub(super) fn draw_home(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Diet Planner",
            Style::default()
                .fg(PLANNER_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Pick the foods you like and get a week of meals"),
        Line::from("that fit your health profile."),
        Line::default(),
        Line::from(vec![
            Span::styled("[l] Login", theme::focused()),
            Span::raw("    "),
            Span::styled("[r] Register", Style::default().fg(LINK_BLUE)),
            Span::raw("    "),
            Span::styled("[q] Quit", theme::hint()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        centered(area, 60, 8),
    );
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let (marker, style) = if focused {
        ("> ", theme::focused())
    } else {
        ("  ", Style::default())
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<18}"), style),
        Span::raw(format!("{value}{cursor}")),
    ])
}

fn masked(password: &str) -> String {
    "*".repeat(password.chars().count())
}

pub(super) fn draw_login(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let form = ctx.input.login();
    let focus = ctx.input.login_focus();

    let text = vec![
        field_line("Name", &form.name, focus == 0),
        field_line("Password", &masked(&form.password), focus == 1),
        Line::default(),
        Line::from(Span::styled(
            "Don't have an account? Ctrl+R to register",
            Style::default().fg(LINK_BLUE),
        )),
    ];

    frame.render_widget(
        Paragraph::new(text).block(panel("Login")),
        centered(area, 56, 7),
    );
}

pub(super) fn draw_register(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let form = ctx.input.registration();
    let focused = ctx.input.register_field();

    let mut text: Vec<Line> = RegisterField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                RegisterField::Name => form.name.clone(),
                RegisterField::Age => form.age.clone(),
                RegisterField::Weight => form.weight.clone(),
                RegisterField::Height => form.height.clone(),
                RegisterField::Health => choice(form.health_conditions.map(|c| c.label())),
                RegisterField::Diet => choice(form.diet_preference.map(|d| d.label())),
                RegisterField::Password => masked(&form.password),
            };
            field_line(field.label(), &value, *field == focused)
        })
        .collect();

    text.push(Line::default());
    text.push(Line::from(Span::styled(
        "Already registered? Ctrl+L to login",
        Style::default().fg(LINK_BLUE),
    )));

    frame.render_widget(
        Paragraph::new(text).block(panel("Create Account")),
        centered(area, 60, 12),
    );
}

fn choice(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("< {label} >"),
        None => "< choose >".to_string(),
    }
}
