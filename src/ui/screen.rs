use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::App;
use crate::panels::Tab;
use crate::ui::{aim, auth, settings, strategy};

/// A UI Screen boundary: everything drawn for one top-level state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Sign-in form, shown while no session exists
pub struct AuthScreen;

impl Screen for AuthScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        auth::render(&app.panels.auth, area, buf);
    }
}

/// Sensitivity generator plus the floating assist overlays
pub struct AimScreen;

impl Screen for AimScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        aim::render(app, area, buf);
    }
}

pub struct StrategyScreen;

impl Screen for StrategyScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        strategy::render(app, area, buf);
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        settings::render(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(app: &App) -> Box<dyn Screen> {
    if app.user().is_none() {
        return Box::new(AuthScreen);
    }
    match app.tab() {
        Tab::Aim => Box::new(AimScreen),
        Tab::Strategy => Box::new(StrategyScreen),
        Tab::Settings => Box::new(SettingsScreen),
    }
}
