use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::ai::StrategyResponse;
use crate::app::App;
use crate::feedback::Vote;
use crate::ui::{accent, bold, chrome, dim, error_style};

const LEGEND: &str = " ←/→ mode · ↑/↓ style · g generate · u/d vote · tab next · q quit";

fn selector(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<7}", label), dim()),
        Span::styled("◀ ", dim()),
        Span::styled(value, accent()),
        Span::styled(" ▶", dim()),
    ])
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let panel = &app.panels.strategy;
    let body = chrome(app, area, buf, LEGEND);

    let [heading, selectors, status, result] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(body);

    Paragraph::new(vec![
        Line::from(Span::styled(
            "TACTICAL BRIEF",
            bold().add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled("AI squad planner", dim())),
    ])
    .render(heading, buf);

    Paragraph::new(vec![
        selector("MODE", panel.mode.to_string()),
        selector("STYLE", panel.style.to_string()),
    ])
    .render(selectors, buf);

    let line = if panel.is_loading() {
        Line::from(Span::styled("ESTABLISHING UPLINK...", accent()))
    } else if let Some(e) = panel.error() {
        Line::from(Span::styled(e.to_string(), error_style()))
    } else {
        Line::default()
    };
    Paragraph::new(line).render(status, buf);

    if let Some(brief) = panel.result() {
        render_brief(brief, panel.vote(), result, buf);
    }
}

fn render_brief(brief: &StrategyResponse, vote: Option<Vote>, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered().title(Span::styled(format!(" {} ", brief.title), accent()));
    let mut lines = vec![
        Line::from(Span::styled("SQUAD", bold().fg(Color::Yellow))),
        Line::from(brief.character_combination.iter().join(" · ")),
        Line::default(),
        Line::from(Span::styled("LOADOUT", bold().fg(Color::Yellow))),
        Line::from(brief.weapon_loadout.iter().join(" / ")),
        Line::default(),
        Line::from(Span::styled("INTEL", bold().fg(Color::Yellow))),
        Line::from(Span::styled(
            brief.tactical_advice.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];
    let (up, down) = match vote {
        Some(Vote::Up) => (accent(), dim()),
        Some(Vote::Down) => (dim(), error_style()),
        None => (dim(), dim()),
    };
    lines.push(Line::from(vec![
        Span::raw("Useful intel? "),
        Span::styled("[u] yes", up),
        Span::raw(" "),
        Span::styled("[d] no", down),
    ]));
    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}
