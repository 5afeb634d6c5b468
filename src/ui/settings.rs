use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Tabs, Widget, Wrap},
};

use crate::app::App;
use crate::panels::settings::{SettingsPanel, SettingsTab, Toggle};
use crate::redeem::RedeemStatus;
use crate::ui::{accent, bold, centered, chrome, dim, error_style};

const LEGEND: &str = " ←/→ section · ↑/↓ select · enter toggle · c clear cache · r reset · l logout";
const REDEEM_LEGEND: &str = " ←/→ section · type code · enter redeem · del reset · tab next";

fn toggle_state(toggle: &Toggle) -> Span<'static> {
    if toggle.is_activating() {
        Span::styled(" ... ", accent().add_modifier(Modifier::SLOW_BLINK))
    } else if toggle.is_on() {
        Span::styled(" ON  ", bold().fg(Color::Green))
    } else {
        Span::styled(" OFF ", dim())
    }
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let panel = &app.panels.settings;
    let legend = match panel.tab() {
        SettingsTab::Redeem => REDEEM_LEGEND,
        _ => LEGEND,
    };
    let body = chrome(app, area, buf, legend);

    let [tabs, _, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(body);

    let selected = SettingsTab::ALL
        .iter()
        .position(|t| *t == panel.tab())
        .unwrap_or(0);
    Tabs::new(SettingsTab::ALL.iter().map(|t| t.to_string()))
        .select(selected)
        .style(dim())
        .highlight_style(accent())
        .render(tabs, buf);

    match panel.tab() {
        SettingsTab::System => render_system(app, panel, content, buf),
        SettingsTab::Redeem => render_redeem(panel, content, buf),
        SettingsTab::About => render_about(content, buf),
    }

    if panel.confirming_reset() {
        render_confirm(area, buf);
    }
}

fn render_system(app: &App, panel: &SettingsPanel, area: Rect, buf: &mut Buffer) {
    let [card, toggles, tools, notice] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    if let Some(user) = app.user() {
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(format!("[{}] ", user.badge()), accent()),
                Span::styled(user.name.clone(), bold()),
            ]),
            Line::from(Span::styled(format!("Signed in via {}", user.method), dim())),
        ])
        .block(Block::bordered().title(" PROFILE "))
        .render(card, buf);
    }

    let mut lines = Vec::new();
    for (i, toggle) in panel.toggles().iter().enumerate() {
        let marker = if i == panel.selected() { "> " } else { "  " };
        let label = if i == panel.selected() {
            Span::styled(toggle.label, accent())
        } else {
            Span::styled(toggle.label, bold())
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            toggle_state(toggle),
            Span::raw(" "),
            label,
        ]));
        lines.push(Line::from(Span::styled(
            format!("        {}", toggle.description),
            dim(),
        )));
    }
    Paragraph::new(lines)
        .block(Block::bordered().title(" SYSTEM BOOST "))
        .render(toggles, buf);

    Paragraph::new(Line::from(vec![
        Span::styled("[c] ", accent()),
        Span::raw("Clear game cache   "),
        Span::styled("[r] ", error_style()),
        Span::raw("Reset app   "),
        Span::styled("[l] ", accent()),
        Span::raw("Log out"),
    ]))
    .block(Block::bordered().title(" TOOLS "))
    .render(tools, buf);

    if let Some(msg) = panel.notice() {
        Paragraph::new(Span::styled(msg.to_string(), bold().fg(Color::Green))).render(notice, buf);
    }
}

fn render_redeem(panel: &SettingsPanel, area: Rect, buf: &mut Buffer) {
    let form = panel.redeem.form();
    let [field, status] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let cursor = if form.status().is_processing() { "" } else { "_" };
    Paragraph::new(Line::from(vec![
        Span::styled(form.code().to_string(), accent()),
        Span::raw(cursor),
    ]))
    .block(Block::bordered().title(" REDEEM CODE "))
    .render(field, buf);

    let line = match form.status() {
        RedeemStatus::Idle => Line::from(Span::styled("12-16 letters or digits", dim())),
        RedeemStatus::Processing => Line::from(Span::styled("Verifying with server...", accent())),
        RedeemStatus::Success(m) => Line::from(Span::styled(m.clone(), bold().fg(Color::Green))),
        RedeemStatus::Error(m) => Line::from(Span::styled(m.clone(), error_style())),
    };
    Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .render(status, buf);
}

fn render_about(area: Rect, buf: &mut Buffer) {
    Paragraph::new(vec![
        Line::from(Span::styled("AIMHQ", accent().add_modifier(Modifier::ITALIC))),
        Line::from(format!("version {}", env!("CARGO_PKG_VERSION"))),
        Line::default(),
        Line::from(Span::styled(
            "Free Fire companion: sensitivity tuning, tactical briefs and aim practice.",
            dim(),
        )),
        Line::from(Span::styled(
            "Not affiliated with Garena. Suggestions are generated and may be wrong.",
            dim(),
        )),
    ])
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

fn render_confirm(area: Rect, buf: &mut Buffer) {
    let popup = centered(area, 44, 6);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled("Erase all saved data?", bold())),
        Line::from(Span::styled("Session, presets and settings go.", dim())),
        Line::default(),
        Line::from(vec![
            Span::styled("[y] ", error_style()),
            Span::raw("reset   "),
            Span::styled("[n] ", accent()),
            Span::raw("cancel"),
        ]),
    ])
    .block(Block::bordered().title(Span::styled(" RESET APP ", error_style())))
    .render(popup, buf);
}
