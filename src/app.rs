//! Application state: the signed-in user, the active tab, every panel and the
//! services they share.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

use crate::ai::{self, Generator};
use crate::auth::{self, Authenticator, OfflineAuthenticator, User};
use crate::clipboard::{Clipboard, Osc52};
use crate::config::Config;
use crate::haptics::{DeviceBridge, HapticPattern};
use crate::history::TrainerLog;
use crate::input::{CellMetrics, PointerEvent};
use crate::overlay::Viewport;
use crate::panels::aim::AimPanel;
use crate::panels::auth::AuthPanel;
use crate::panels::settings::SettingsPanel;
use crate::panels::strategy::StrategyPanel;
use crate::panels::{is_char, Ctx, PanelAction, Tab};
use crate::redeem::{OfflineRedeemer, Redeemer};
use crate::runtime::{AppEvent, JobResult, JobSender};
use crate::store::{keys, Persistence};
use crate::timer::{Clock, SystemClock};

/// Injected collaborators. Tests swap every one of them.
pub struct Services {
    pub generator: Arc<dyn Generator>,
    pub authenticator: Arc<dyn Authenticator>,
    pub redeemer: Arc<dyn Redeemer>,
    pub bridge: DeviceBridge,
    pub clipboard: Box<dyn Clipboard>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Real terminal host: bell haptics, OSC 52 clipboard, wall clock
    pub fn terminal(config: &Config) -> Self {
        Self {
            generator: ai::from_config(config),
            authenticator: Arc::new(OfflineAuthenticator),
            redeemer: Arc::new(OfflineRedeemer),
            bridge: DeviceBridge::terminal(config.haptics),
            clipboard: Box::new(Osc52::stdout()),
            clock: Arc::new(SystemClock::new()),
        }
    }
}

pub struct Panels {
    pub auth: AuthPanel,
    pub aim: AimPanel,
    pub strategy: StrategyPanel,
    pub settings: SettingsPanel,
}

impl Panels {
    fn new(
        store: &Persistence,
        config: &Config,
        viewport: Viewport,
        trainer_log: Option<TrainerLog>,
    ) -> Self {
        Self {
            auth: AuthPanel::default(),
            aim: AimPanel::new(
                store,
                viewport,
                config.default_cps,
                config.trainer_duration_secs,
                trainer_log,
            ),
            strategy: StrategyPanel::default(),
            settings: SettingsPanel::default(),
        }
    }
}

pub struct App {
    store: Persistence,
    config: Config,
    services: Services,
    jobs: JobSender,
    metrics: CellMetrics,
    size: (u16, u16),
    tab: Tab,
    user: Option<User>,
    trainer_log: Option<TrainerLog>,
    pub panels: Panels,
    should_quit: bool,
}

impl App {
    /// `size` is the terminal size in cells
    pub fn new(
        store: Persistence,
        config: Config,
        services: Services,
        jobs: JobSender,
        size: (u16, u16),
        trainer_log: Option<TrainerLog>,
    ) -> Self {
        let metrics = CellMetrics::new(config.cell_width_px, config.cell_height_px);
        let viewport = metrics.viewport(size.0, size.1);
        let user = auth::restore_session(&store);
        let tab = store
            .get(keys::ACTIVE_TAB)
            .and_then(|raw| Tab::from_key(&raw))
            .unwrap_or_default();
        let panels = Panels::new(&store, &config, viewport, trainer_log.clone());
        tracing::debug!(signed_in = user.is_some(), %tab, "app state restored");

        Self {
            store,
            config,
            services,
            jobs,
            metrics,
            size,
            tab,
            user,
            trainer_log,
            panels,
            should_quit: false,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn store(&self) -> &Persistence {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.metrics.viewport(self.size.0, self.size.1)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn parts(&mut self) -> (Ctx<'_>, &mut Panels) {
        (
            Ctx {
                store: &self.store,
                services: &mut self.services,
                jobs: &self.jobs,
                config: &self.config,
            },
            &mut self.panels,
        )
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Mouse(mouse) => {
                if let Some(pointer) = PointerEvent::from_mouse(&mouse, &self.metrics) {
                    self.on_pointer(pointer);
                }
            }
            AppEvent::Resize(cols, rows) => self.resize(cols, rows),
            AppEvent::Tick => self.tick(),
            AppEvent::Job(result) => self.on_job(result),
        }
    }

    pub fn on_pointer(&mut self, pointer: PointerEvent) {
        if self.user.is_none() || self.tab != Tab::Aim {
            return;
        }
        let (mut ctx, panels) = self.parts();
        panels.aim.on_pointer(pointer, &mut ctx);
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
        let viewport = self.viewport();
        let reclamp = self.config.reclamp_on_resize;
        self.panels.aim.resize(viewport, &self.store, reclamp);
    }

    pub fn tick(&mut self) {
        if self.user.is_none() {
            return;
        }
        let tab = self.tab;
        let (mut ctx, panels) = self.parts();
        if tab == Tab::Aim {
            panels.aim.tick(&mut ctx);
        }
        panels.settings.tick(&mut ctx);
    }

    pub fn on_job(&mut self, result: JobResult) {
        let (mut ctx, panels) = self.parts();
        match result {
            JobResult::Brief(r) => panels.strategy.finish(r, &mut ctx),
            JobResult::Sensitivity(r) => panels.aim.finish(r, &mut ctx),
            JobResult::Redeem(r) => panels.settings.redeem.finish(r, &mut ctx),
            JobResult::Auth(r) => {
                if let Some(user) = panels.auth.finish(r, &mut ctx) {
                    self.user = Some(user);
                }
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.user.is_none() {
            if key.code == KeyCode::Esc {
                self.should_quit = true;
                return;
            }
            let (mut ctx, panels) = self.parts();
            panels.auth.on_key(key, &mut ctx);
            return;
        }

        let (overlay, captures) = match self.tab {
            Tab::Aim => (
                self.panels.aim.has_overlay() || self.panels.aim.assist_open(),
                self.panels.aim.captures_text(),
            ),
            Tab::Settings => (
                self.panels.settings.has_overlay(),
                self.panels.settings.captures_text(),
            ),
            Tab::Strategy => (false, false),
        };

        if !overlay {
            match key.code {
                KeyCode::Tab => return self.switch_tab(self.tab.next()),
                KeyCode::BackTab => {
                    let prev = crate::ai::types::cycle(&Tab::ALL, self.tab, false);
                    return self.switch_tab(prev);
                }
                KeyCode::Esc => {
                    self.should_quit = true;
                    return;
                }
                _ => {}
            }
            if !captures {
                for (c, tab) in ['1', '2', '3'].into_iter().zip(Tab::ALL) {
                    if is_char(&key, c) {
                        return self.switch_tab(tab);
                    }
                }
                if is_char(&key, 'q') {
                    self.should_quit = true;
                    return;
                }
            }
        }

        let tab = self.tab;
        let (mut ctx, panels) = self.parts();
        let action = match tab {
            Tab::Aim => panels.aim.on_key(key, &mut ctx),
            Tab::Strategy => panels.strategy.on_key(key, &mut ctx),
            Tab::Settings => panels.settings.on_key(key, &mut ctx),
        };
        self.apply(action);
    }

    pub fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::None => {}
            PanelAction::SwitchTab(tab) => self.switch_tab(tab),
            PanelAction::Logout => self.logout(),
            PanelAction::ResetApp => self.reset(),
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        if self.tab == Tab::Aim {
            self.panels.aim.suspend();
        }
        self.tab = tab;
        self.store.set(keys::ACTIVE_TAB, tab.as_key());
        self.services.bridge.haptic(HapticPattern::Light);
    }

    pub fn logout(&mut self) {
        auth::clear_session(&self.store);
        self.panels.aim.suspend();
        self.panels.auth = AuthPanel::default();
        self.user = None;
        tracing::info!("signed out");
    }

    /// Wipe every stored key and start over at the sign-in screen
    pub fn reset(&mut self) {
        self.panels.aim.suspend();
        self.store.clear();
        self.tab = Tab::default();
        self.user = None;
        let viewport = self.viewport();
        self.panels = Panels::new(&self.store, &self.config, viewport, self.trainer_log.clone());
        tracing::info!("app data reset");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Arc;
    use std::time::Duration;

    use super::Services;
    use crate::ai::Unconfigured;
    use crate::auth::OfflineAuthenticator;
    use crate::clipboard::MemoryClipboard;
    use crate::config::Config;
    use crate::haptics::{DeviceBridge, Recorder};
    use crate::panels::Ctx;
    use crate::redeem::OfflineRedeemer;
    use crate::runtime::{AppEvent, JobResult, JobSender};
    use crate::store::Persistence;
    use crate::timer::ManualClock;

    /// Panel test rig: in-memory store, recorded device calls, manual clock
    pub struct Harness {
        pub store: Persistence,
        pub services: Services,
        pub jobs: JobSender,
        pub rx: Receiver<AppEvent>,
        pub config: Config,
        pub recorder: Recorder,
        pub clipboard: MemoryClipboard,
        pub clock: ManualClock,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::build(MemoryClipboard::new())
        }

        pub fn with_denied_clipboard() -> Self {
            Self::build(MemoryClipboard::denied())
        }

        pub fn services(recorder: &Recorder, clipboard: &MemoryClipboard, clock: &ManualClock) -> Services {
            Services {
                generator: Arc::new(Unconfigured),
                authenticator: Arc::new(OfflineAuthenticator),
                redeemer: Arc::new(OfflineRedeemer),
                bridge: DeviceBridge::recording(recorder),
                clipboard: Box::new(clipboard.clone()),
                clock: Arc::new(clock.clone()),
            }
        }

        fn build(clipboard: MemoryClipboard) -> Self {
            let (tx, rx) = mpsc::channel();
            let recorder = Recorder::new();
            let clock = ManualClock::new();
            Self {
                store: Persistence::in_memory(),
                services: Self::services(&recorder, &clipboard, &clock),
                jobs: JobSender::new(tx),
                rx,
                config: Config::default(),
                recorder,
                clipboard,
                clock,
            }
        }

        pub fn ctx(&mut self) -> Ctx<'_> {
            Ctx {
                store: &self.store,
                services: &mut self.services,
                jobs: &self.jobs,
                config: &self.config,
            }
        }

        /// Wait for the next background job to report back
        pub fn next_job(&self) -> JobResult {
            match self.rx.recv_timeout(Duration::from_secs(5)) {
                Ok(AppEvent::Job(result)) => result,
                other => panic!("expected a job result, got {:?}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use crate::auth::AuthMethod;
    use crate::clipboard::MemoryClipboard;
    use crate::haptics::Recorder;
    use crate::timer::ManualClock;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    fn user() -> User {
        User {
            id: "google_1".into(),
            name: "FF_Gamer_Google".into(),
            method: AuthMethod::Google,
            avatar: Some("G".into()),
        }
    }

    fn app_with(store: Persistence) -> (App, Receiver<AppEvent>, ManualClock) {
        let (tx, rx) = mpsc::channel();
        let clock = ManualClock::new();
        let services = Harness::services(&Recorder::new(), &MemoryClipboard::new(), &clock);
        let app = App::new(
            store,
            Config::default(),
            services,
            JobSender::new(tx),
            (100, 50),
            None,
        );
        (app, rx, clock)
    }

    fn signed_in() -> (App, Receiver<AppEvent>, ManualClock) {
        let store = Persistence::in_memory();
        auth::persist_session(&store, &user());
        app_with(store)
    }

    fn press(app: &mut App, c: char) {
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::Char(c))));
    }

    #[test]
    fn restores_session_and_tab() {
        let store = Persistence::in_memory();
        auth::persist_session(&store, &user());
        store.set(keys::ACTIVE_TAB, "strategy");
        let (app, _rx, _clock) = app_with(store);
        assert_eq!(app.user(), Some(&user()));
        assert_eq!(app.tab(), Tab::Strategy);
    }

    #[test]
    fn corrupt_tab_and_session_fall_back() {
        let store = Persistence::in_memory();
        store.set(keys::ACTIVE_TAB, "arcade");
        store.set(keys::USER_SESSION, "{not json");
        let (app, _rx, _clock) = app_with(store);
        assert_eq!(app.user(), None);
        assert_eq!(app.tab(), Tab::Aim);
        assert_eq!(app.store().get(keys::USER_SESSION), None);
    }

    #[test]
    fn sign_in_through_job() {
        let (mut app, rx, _clock) = app_with(Persistence::in_memory());
        app.handle(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('g'),
            KeyModifiers::CONTROL,
        )));
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.handle(event);
        assert_eq!(app.user().map(|u| u.name.as_str()), Some("FF_Gamer_Google"));
        assert!(auth::restore_session(app.store()).is_some());
    }

    #[test]
    fn number_keys_switch_and_persist_tab() {
        let (mut app, _rx, _clock) = signed_in();
        press(&mut app, '2');
        assert_eq!(app.tab(), Tab::Strategy);
        assert_eq!(app.store().get(keys::ACTIVE_TAB).as_deref(), Some("strategy"));
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::Tab)));
        assert_eq!(app.tab(), Tab::Settings);
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::BackTab)));
        assert_eq!(app.tab(), Tab::Strategy);
    }

    #[test]
    fn digits_go_to_device_field_while_editing() {
        let (mut app, _rx, _clock) = signed_in();
        press(&mut app, '/');
        press(&mut app, '1');
        press(&mut app, '3');
        assert_eq!(app.tab(), Tab::Aim);
        assert_eq!(app.panels.aim.device(), "13");
    }

    #[test]
    fn leaving_aim_stops_macro() {
        let (mut app, _rx, clock) = signed_in();
        press(&mut app, 'm');
        assert!(app.panels.aim.macro_tap().is_active());
        clock.advance(Duration::from_millis(60));
        app.handle(AppEvent::Tick);
        assert!(app.panels.aim.macro_tap().pulses() > 0);

        press(&mut app, '3');
        assert!(!app.panels.aim.macro_tap().is_active());
    }

    #[test]
    fn logout_returns_to_auth() {
        let (mut app, _rx, _clock) = signed_in();
        press(&mut app, '3');
        press(&mut app, 'l');
        assert_eq!(app.user(), None);
        assert_eq!(app.store().get(keys::USER_SESSION), None);
        // Esc on the auth screen quits
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::Esc)));
        assert!(app.should_quit());
    }

    #[test]
    fn reset_wipes_store() {
        let (mut app, _rx, _clock) = signed_in();
        app.store().set(keys::DEVICE_MODEL, "Pixel 8");
        press(&mut app, '3');
        press(&mut app, 'r');
        press(&mut app, 'y');
        assert_eq!(app.user(), None);
        assert_eq!(app.tab(), Tab::Aim);
        assert_eq!(app.store().get(keys::DEVICE_MODEL), None);
        assert_eq!(app.store().get(keys::ACTIVE_TAB), None);
        assert_eq!(app.panels.aim.device(), "");
    }

    #[test]
    fn resize_reclamps_overlays() {
        let (mut app, _rx, _clock) = signed_in();
        app.handle(AppEvent::Resize(40, 20));
        let vp = app.viewport();
        let pos = app.panels.aim.assist().position();
        assert!(pos.x <= vp.width - 12.0 - 48.0);
        assert!(pos.y <= vp.height - 90.0 - 48.0);
    }

    #[test]
    fn mouse_tap_opens_assist_menu() {
        use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
        let (mut app, _rx, _clock) = signed_in();
        let pos = app.panels.aim.assist().position();
        let cell = app.metrics().to_cells(pos.x + 4.0, pos.y + 4.0, 1.0, 1.0);
        for kind in [
            MouseEventKind::Down(MouseButton::Left),
            MouseEventKind::Up(MouseButton::Left),
        ] {
            app.handle(AppEvent::Mouse(MouseEvent {
                kind,
                column: cell.col,
                row: cell.row,
                modifiers: KeyModifiers::NONE,
            }));
        }
        assert!(app.panels.aim.assist_open());
        // Esc now closes the menu instead of quitting
        app.handle(AppEvent::Key(KeyEvent::from(KeyCode::Esc)));
        assert!(!app.panels.aim.assist_open());
        assert!(!app.should_quit());
    }
}
