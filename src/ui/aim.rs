//! Aim tab: device field, sensitivity result, floating overlays, modals and
//! the full-screen reaction trainer.

use chrono::{Local, TimeZone};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, LineGauge, Paragraph, Row, Table, Widget, Wrap},
};

use crate::ai::types::{DPI_MAX, DPI_MIN, FIRE_BUTTON_MAX, SENSITIVITY_MAX};
use crate::ai::SensitivityResponse;
use crate::app::App;
use crate::feedback::Vote;
use crate::overlay::{Position, Size, ASSIST_HANDLE_SIZE};
use crate::panels::aim::{
    trainer_target_center, AimModal, AimPanel, Crosshair, TRAINER_TARGET_RADIUS_PX,
};
use crate::presets::Preset;
use crate::trainer::{ReactionTrainer, TrainerState};
use crate::ui::charting::render_reaction_chart;
use crate::ui::{accent, bold, centered, chrome, dim, error_style, pixel_rect, put_centered};

const LEGEND: &str =
    " / device · g generate · s share · p save · l presets · [ ] dpi · u/d vote · a assist · t trainer · q quit";

pub fn color_named(name: &str) -> Color {
    match name {
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "cyan" => Color::Cyan,
        "fuchsia" => Color::Magenta,
        "white" => Color::White,
        _ => Color::Red,
    }
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let aim = &app.panels.aim;
    if let Some(trainer) = aim.trainer() {
        render_trainer(app, trainer, area, buf);
        return;
    }

    let body = chrome(app, area, buf, LEGEND);
    render_body(aim, body, buf);
    render_overlays(app, area, buf);
    if let Some(modal) = aim.modal() {
        render_modal(aim, modal, area, buf);
    }
}

fn render_body(aim: &AimPanel, area: Rect, buf: &mut Buffer) {
    let [device, status, result] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let title_style = if aim.is_editing() { accent() } else { bold() };
    let value = if aim.device().is_empty() && !aim.is_editing() {
        Span::styled("e.g. iPhone 13, Poco X3 Pro", dim())
    } else if aim.is_editing() {
        Span::raw(format!("{}_", aim.device()))
    } else {
        Span::raw(aim.device().to_string())
    };
    Paragraph::new(Line::from(value))
        .block(Block::bordered().title(Span::styled(" TARGET DEVICE ", title_style)))
        .render(device, buf);

    status_line(aim).render(status, buf);

    match aim.config() {
        Some(config) => render_config(config, aim.vote(), result, buf),
        None => Paragraph::new(Line::from(Span::styled(
            "Enter your device and press g to generate a headshot sensitivity profile.",
            dim(),
        )))
        .wrap(Wrap { trim: true })
        .render(result, buf),
    }
}

fn status_line(aim: &AimPanel) -> Line<'static> {
    let mut spans = Vec::new();
    if aim.is_loading() {
        spans.push(Span::styled("CALIBRATING... ", accent()));
    } else if let Some(e) = aim.error() {
        spans.push(Span::styled(format!("{} ", e), error_style()));
    }
    if aim.is_copied() {
        spans.push(Span::styled("COPIED ", bold().fg(Color::Green)));
    }
    if let Some(notice) = aim.notice() {
        spans.push(Span::styled(format!("{} ", notice), dim()));
    }
    if aim.is_boosting() {
        spans.push(Span::styled("BOOSTING... ", bold().fg(Color::Cyan)));
    }
    if aim.macro_tap().is_active() {
        spans.push(Span::styled(
            format!("MACRO {} CPS ", aim.macro_tap().cps()),
            bold().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn gauge(label: String, ratio: f64, color: Color) -> LineGauge<'static> {
    LineGauge::default()
        .label(label)
        .ratio(ratio.clamp(0.0, 1.0))
        .filled_style(Style::default().fg(color))
        .unfilled_style(dim())
}

fn render_config(config: &SensitivityResponse, vote: Option<Vote>, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered().title(Span::styled(
        format!(" {} ", config.device_name.to_uppercase()),
        accent(),
    ));
    let inner = block.inner(area);
    block.render(area, buf);

    let mut constraints = vec![Constraint::Length(1); 8];
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let rows = Layout::vertical(constraints).split(inner);

    for (i, (label, value)) in config.settings.rows().into_iter().enumerate() {
        gauge(
            format!("{:<13}{:>4}", label, value),
            f64::from(value) / f64::from(SENSITIVITY_MAX),
            crate::ui::ACCENT,
        )
        .render(rows[i], buf);
    }
    gauge(
        format!("{:<13}{:>3}%", "Fire Button", config.fire_button_size),
        f64::from(config.fire_button_size) / f64::from(FIRE_BUTTON_MAX),
        Color::Red,
    )
    .render(rows[6], buf);
    gauge(
        format!("{:<13}{:>4}", "DPI [ ]", config.dpi),
        f64::from(config.dpi.saturating_sub(DPI_MIN)) / f64::from(DPI_MAX - DPI_MIN),
        Color::Cyan,
    )
    .render(rows[7], buf);

    Paragraph::new(Line::from(Span::styled(
        config.notes.clone(),
        Style::default().add_modifier(Modifier::ITALIC),
    )))
    .wrap(Wrap { trim: true })
    .render(rows[8], buf);

    let (up, down) = match vote {
        Some(Vote::Up) => (accent(), dim()),
        Some(Vote::Down) => (dim(), error_style()),
        None => (dim(), dim()),
    };
    Paragraph::new(Line::from(vec![
        Span::raw("Helpful? "),
        Span::styled("[u] yes", up),
        Span::raw(" "),
        Span::styled("[d] no", down),
    ]))
    .render(rows[9], buf);
}

fn render_overlays(app: &App, area: Rect, buf: &mut Buffer) {
    let aim = &app.panels.aim;
    let viewport = aim.viewport();
    let stealthy = |style: Style| {
        if aim.stealth() {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        }
    };

    if aim.crosshair() != Crosshair::Off {
        let glyph = match aim.crosshair() {
            Crosshair::Dot => "•",
            Crosshair::Cross => "─┼─",
            _ => "◎",
        };
        let centre = Position::new(viewport.width / 2.0, viewport.height / 2.0);
        let tiny = Size {
            width: 1.0,
            height: 1.0,
        };
        if let Some(cell) = pixel_rect(app, centre, tiny, area) {
            let row = Rect::new(cell.x.saturating_sub(1), cell.y, 3, 1).intersection(area);
            let style = stealthy(bold().fg(color_named(aim.crosshair_color())));
            put_centered(buf, row, row.y, glyph, style);
        }
    }

    let target = aim.macro_target();
    if aim.macro_tap().is_active() {
        if let Some(rect) = pixel_rect(app, target.origin(), target.size(), area) {
            let style = if aim.is_tapping() {
                bold().fg(Color::Black).bg(Color::Red)
            } else {
                bold().fg(Color::Red)
            };
            Clear.render(rect, buf);
            Block::bordered().border_style(stealthy(style)).render(rect, buf);
            let mid = rect.y + rect.height / 2;
            put_centered(buf, rect, mid, "TAP", stealthy(style));
            put_centered(
                buf,
                rect,
                rect.bottom().saturating_sub(1),
                &format!("{}", aim.macro_tap().cps()),
                stealthy(dim()),
            );
        }
    }

    let handle = aim.assist();
    if let Some(rect) = pixel_rect(app, handle.origin(), ASSIST_HANDLE_SIZE, area) {
        let style = if handle.is_dragging() {
            accent().add_modifier(Modifier::REVERSED)
        } else {
            stealthy(accent())
        };
        Clear.render(rect, buf);
        Block::bordered().border_style(style).render(rect, buf);
        put_centered(buf, rect, rect.y + rect.height / 2, "AI", style);

        if aim.assist_open() {
            render_assist_menu(aim, rect, area, buf);
        }
    }
}

fn render_assist_menu(aim: &AimPanel, handle: Rect, area: Rect, buf: &mut Buffer) {
    let on_off = |b: bool| if b { "ON" } else { "OFF" };
    let lines = vec![
        ", settings".to_string(),
        "t trainer".to_string(),
        format!("x crosshair  {}", aim.crosshair().label()),
        format!("c colour     {}", aim.crosshair_color()),
        format!("m macro      {}", on_off(aim.macro_tap().is_active())),
        format!("< > cps      {}", aim.macro_tap().cps()),
        "o notify".to_string(),
        format!("h stealth    {}", on_off(aim.stealth())),
        format!(
            "b boost      {}",
            if aim.is_boosting() { "..." } else { "ready" }
        ),
    ];
    let width = 26;
    let height = lines.len() as u16 + 2;
    let x = handle
        .x
        .saturating_sub(width + 1)
        .max(area.x)
        .min(area.right().saturating_sub(width));
    let y = handle
        .y
        .saturating_sub(height / 2)
        .max(area.y)
        .min(area.bottom().saturating_sub(height));
    let popup = Rect::new(x, y, width, height).intersection(area);

    Clear.render(popup, buf);
    Paragraph::new(lines.into_iter().map(Line::from).collect::<Vec<_>>())
        .block(Block::bordered().title(Span::styled(" GAME ASSIST ", accent())))
        .render(popup, buf);
}

fn preset_row(preset: &Preset, selected: bool) -> Row<'static> {
    let saved = Local
        .timestamp_millis_opt(preset.timestamp)
        .single()
        .map(|t| t.format("%b %d %H:%M").to_string())
        .unwrap_or_default();
    let style = if selected {
        accent().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Row::new(vec![
        preset.name.clone(),
        preset.config.device_name.clone(),
        preset.config.dpi.to_string(),
        saved,
    ])
    .style(style)
}

fn render_modal(aim: &AimPanel, modal: &AimModal, area: Rect, buf: &mut Buffer) {
    match modal {
        AimModal::SavePreset(name) => {
            let popup = centered(area, 44, 5);
            Clear.render(popup, buf);
            Paragraph::new(vec![
                Line::from(vec![Span::styled("Name: ", bold()), Span::raw(format!("{}_", name.value()))]),
                Line::default(),
                Line::from(Span::styled("enter save · esc cancel", dim())),
            ])
            .block(Block::bordered().title(Span::styled(" SAVE PRESET ", accent())))
            .render(popup, buf);
        }
        AimModal::Presets { selected } => {
            let presets = aim.presets();
            let height = (presets.len() as u16).clamp(1, 12) + 5;
            let popup = centered(area, 64, height);
            Clear.render(popup, buf);
            let block = Block::bordered()
                .title(Span::styled(" SAVED PRESETS ", accent()))
                .title_bottom(Span::styled(" enter load · x delete · esc close ", dim()));
            if presets.is_empty() {
                Paragraph::new(Span::styled("No saved presets.", dim()))
                    .block(block)
                    .render(popup, buf);
                return;
            }
            let rows = presets
                .items()
                .iter()
                .enumerate()
                .map(|(i, p)| preset_row(p, i == *selected));
            Table::new(
                rows,
                [
                    Constraint::Min(16),
                    Constraint::Min(16),
                    Constraint::Length(5),
                    Constraint::Length(13),
                ],
            )
            .header(Row::new(vec!["NAME", "DEVICE", "DPI", "SAVED"]).style(bold().fg(Color::Yellow)))
            .block(block)
            .render(popup, buf);
        }
    }
}

fn render_trainer(app: &App, trainer: &ReactionTrainer, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);
    let block = Block::bordered()
        .title(Span::styled(" REACTION TRAINER ", accent()))
        .title_bottom(Span::styled(" space start · click targets · esc close ", dim()));
    let inner = block.inner(area);
    block.render(area, buf);

    let [stats, field] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
    Paragraph::new(Line::from(vec![
        Span::styled(format!("SCORE {}", trainer.score()), accent()),
        Span::raw("   "),
        Span::styled(format!("TIME {}s", trainer.time_left()), bold()),
        Span::raw("   "),
        Span::raw(format!("ACC {}%", trainer.accuracy())),
        Span::raw("   "),
        Span::raw(format!("AVG {}ms", trainer.average_reaction())),
    ]))
    .render(stats, buf);

    match trainer.state() {
        TrainerState::Idle => {
            let mid = field.y + field.height / 2;
            put_centered(buf, field, mid, "Tap the targets as fast as you can", bold());
            put_centered(buf, field, mid.saturating_add(1), "press space to start", dim());
        }
        TrainerState::Playing => {
            let c = trainer_target_center(trainer.target(), app.panels.aim.viewport());
            let r = TRAINER_TARGET_RADIUS_PX;
            let size = Size {
                width: r * 2.0,
                height: r * 2.0,
            };
            if let Some(rect) = pixel_rect(app, Position::new(c.x - r, c.y - r), size, area) {
                let style = bold().fg(Color::White).bg(Color::Red);
                for y in rect.top()..rect.bottom() {
                    buf.set_style(Rect::new(rect.x, y, rect.width, 1), style);
                }
                put_centered(buf, rect, rect.y + rect.height / 2, "◎", style);
            }
        }
        TrainerState::Finished => {
            let s = trainer.summary();
            let [summary, chart] =
                Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(field);
            Paragraph::new(vec![
                Line::from(Span::styled("TIME UP", accent())),
                Line::from(format!(
                    "{} hits / {} taps   {}% accuracy",
                    s.score, s.total_taps, s.accuracy
                )),
                Line::from(format!(
                    "avg {}ms   sd {:.1}ms",
                    s.average_reaction_ms, s.reaction_std_dev_ms
                )),
                Line::from(Span::styled("space to play again", dim())),
            ])
            .alignment(ratatui::layout::Alignment::Center)
            .render(summary, buf);
            if !trainer.reaction_times().is_empty() {
                render_reaction_chart(trainer.reaction_times(), chart, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::SensitivitySettings;
    use crate::runtime::AppEvent;
    use crate::ui::tests::{rendered, test_app};
    use crossterm::event::{KeyCode, KeyEvent};

    fn press(app: &mut App, c: char) {
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::Char(c))));
    }

    fn config() -> SensitivityResponse {
        SensitivityResponse {
            device_name: "iPhone 13".into(),
            settings: SensitivitySettings {
                general: 195,
                red_dot: 180,
                scope2x: 170,
                scope4x: 160,
                sniper_scope: 100,
                free_look: 140,
            },
            fire_button_size: 48,
            dpi: 560,
            notes: "Drag up fast.".into(),
        }
    }

    #[test]
    fn empty_state_prompts_for_device() {
        let app = test_app(true);
        let out = rendered(&app);
        assert!(out.contains("TARGET DEVICE"));
        assert!(out.contains("e.g. iPhone 13"));
        assert!(out.contains("AI"));
    }

    #[test]
    fn config_shows_bars_and_dpi() {
        let mut app = test_app(true);
        app.on_job(crate::runtime::JobResult::Sensitivity(Ok(config())));
        let out = rendered(&app);
        assert!(out.contains("IPHONE 13"));
        assert!(out.contains("General       195"));
        assert!(out.contains("Fire Button   48%"));
        assert!(out.contains("560"));
        assert!(out.contains("Drag up fast."));
    }

    #[test]
    fn assist_menu_and_macro_target_render() {
        let mut app = test_app(true);
        press(&mut app, 'a');
        press(&mut app, 'm');
        let out = rendered(&app);
        assert!(out.contains("GAME ASSIST"));
        assert!(out.contains("TAP"));
        assert!(out.contains("m macro      ON"));
    }

    #[test]
    fn trainer_takes_over_screen() {
        let mut app = test_app(true);
        press(&mut app, 't');
        let out = rendered(&app);
        assert!(out.contains("REACTION TRAINER"));
        assert!(out.contains("press space to start"));
        assert!(!out.contains("TARGET DEVICE"));
    }

    #[test]
    fn colour_names_map() {
        assert_eq!(color_named("fuchsia"), Color::Magenta);
        assert_eq!(color_named("anything"), Color::Red);
    }
}
