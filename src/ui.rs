pub mod aim;
pub mod auth;
pub mod charting;
pub mod screen;
pub mod settings;
pub mod strategy;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::overlay::{Position, Size};
use crate::panels::Tab;

const HORIZONTAL_MARGIN: u16 = 2;
pub(crate) const ACCENT: Color = Color::Rgb(255, 170, 0);

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn accent() -> Style {
    bold().fg(ACCENT)
}

pub(crate) fn error_style() -> Style {
    bold().fg(Color::Red)
}

/// A `width x height` box centred in `area`, shrunk to fit
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

/// Cells covered by a pixel box, clipped to `area`
pub(crate) fn pixel_rect(app: &App, origin: Position, size: Size, area: Rect) -> Option<Rect> {
    let cells = app
        .metrics()
        .to_cells(origin.x, origin.y, size.width, size.height);
    let rect = Rect::new(
        area.x.saturating_add(cells.col),
        area.y.saturating_add(cells.row),
        cells.width,
        cells.height,
    )
    .intersection(area);
    (!rect.is_empty()).then_some(rect)
}

/// Write `label` centred on row `y` of `rect`
pub(crate) fn put_centered(buf: &mut Buffer, rect: Rect, y: u16, label: &str, style: Style) {
    if rect.width == 0 || y < rect.y || y >= rect.bottom() {
        return;
    }
    let w = (label.width() as u16).min(rect.width);
    let x = rect.x + (rect.width - w) / 2;
    buf.set_stringn(x, y, label, rect.width as usize, style);
}

/// Title bar with the tab strip and the signed-in badge
fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let [title, tabs, badge] = Layout::horizontal([
        Constraint::Length(9),
        Constraint::Min(10),
        Constraint::Length(24),
    ])
    .areas(area);

    Paragraph::new(Span::styled(" AIMHQ ", accent().add_modifier(Modifier::ITALIC)))
        .render(title, buf);

    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t)));
    Tabs::new(titles)
        .select(app.tab().index())
        .style(dim())
        .highlight_style(accent().add_modifier(Modifier::REVERSED))
        .divider("|")
        .render(tabs, buf);

    if let Some(user) = app.user() {
        Paragraph::new(Line::from(vec![
            Span::styled(format!("[{}] ", user.badge()), accent()),
            Span::raw(user.name.clone()),
        ]))
        .alignment(Alignment::Right)
        .render(badge, buf);
    }
}

fn render_legend(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(area, buf);
}

/// Splits the frame into header, body and legend rows
pub(crate) fn chrome(app: &App, area: Rect, buf: &mut Buffer, legend: &str) -> Rect {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);
    render_header(app, header, buf);
    render_legend(legend, footer, buf);
    Rect {
        x: body.x + HORIZONTAL_MARGIN.min(body.width / 2),
        width: body.width.saturating_sub(HORIZONTAL_MARGIN * 2),
        ..body
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self).render(self, area, buf);
    }
}
