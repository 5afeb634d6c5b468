use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::auth::{AuthMethod, AuthMode};
use crate::panels::auth::{AuthPanel, Field};
use crate::ui::{accent, bold, centered, dim, error_style, put_centered};

const FORM_WIDTH: u16 = 46;
const FORM_HEIGHT: u16 = 16;

fn field_line(panel: &AuthPanel, field: Field, label: &str, masked: bool) -> Line<'static> {
    let input = panel.field(field);
    let value = if masked {
        "*".repeat(input.value().chars().count())
    } else {
        input.value().to_string()
    };
    let focused = panel.focus() == field;
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(
            format!("{:>9} ", label),
            if focused { accent() } else { dim() },
        ),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

pub fn render(panel: &AuthPanel, area: Rect, buf: &mut Buffer) {
    let form = centered(area, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::bordered().title(Span::styled(" COMMAND CENTER ", accent()));
    let inner = block.inner(form);
    block.render(form, buf);

    let [mode, methods, _, fields, _, error, _, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    let heading = match panel.mode() {
        AuthMode::Login => "LOGIN TO CONTINUE",
        AuthMode::Signup => "CREATE YOUR ACCOUNT",
    };
    put_centered(buf, mode, mode.y, heading, bold().add_modifier(Modifier::ITALIC));

    let tab = |method: AuthMethod, label: &'static str| {
        if panel.method() == method {
            Span::styled(format!(" {} ", label), accent().add_modifier(Modifier::REVERSED))
        } else {
            Span::styled(format!(" {} ", label), dim())
        }
    };
    Paragraph::new(Line::from(vec![
        tab(AuthMethod::Email, "EMAIL"),
        Span::raw("  "),
        tab(AuthMethod::Phone, "PHONE"),
    ]))
    .alignment(ratatui::layout::Alignment::Center)
    .render(methods, buf);

    let lines = match panel.method() {
        AuthMethod::Phone => vec![field_line(panel, Field::Phone, "PHONE", false)],
        _ => vec![
            field_line(panel, Field::Email, "EMAIL", false),
            field_line(panel, Field::Password, "PASSWORD", true),
        ],
    };
    Paragraph::new(lines).render(fields, buf);

    let status = if panel.is_loading() {
        Line::from(Span::styled("AUTHENTICATING...", accent()))
    } else if let Some(e) = panel.error() {
        Line::from(Span::styled(e.to_string(), error_style()))
    } else {
        Line::default()
    };
    Paragraph::new(status)
        .wrap(Wrap { trim: true })
        .render(error, buf);

    let submit = match panel.mode() {
        AuthMode::Login => "enter: sign in",
        AuthMode::Signup => "enter: create account",
    };
    Paragraph::new(vec![
        Line::from(Span::styled(submit, bold())),
        Line::from(Span::styled("←/→ method · tab field · ctrl-g google", dim())),
        Line::from(Span::styled("ctrl-t login/signup · esc quit", dim())),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .render(hints, buf);
}
