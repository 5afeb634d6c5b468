use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::time::Duration;

use aimhq::ai::{GameMode, Generator, PlayStyle, SensitivityResponse, StrategyResponse};
use aimhq::app::{App, Services};
use aimhq::auth::OfflineAuthenticator;
use aimhq::clipboard::MemoryClipboard;
use aimhq::config::Config;
use aimhq::error::GenerationError;
use aimhq::haptics::{DeviceBridge, Recorder};
use aimhq::panels::Tab;
use aimhq::redeem::OfflineRedeemer;
use aimhq::runtime::{AppEvent, FixedTicker, JobSender, Runner, TestEventSource};
use aimhq::store::{keys, Persistence};
use aimhq::timer::ManualClock;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Answers every request with a fixed, valid payload
struct CannedGenerator;

impl Generator for CannedGenerator {
    fn tactical_brief(
        &self,
        mode: GameMode,
        _style: PlayStyle,
    ) -> Result<StrategyResponse, GenerationError> {
        StrategyResponse::from_payload(&format!(
            r#"{{"title":"{} Plan","characterCombination":["Alok","Chrono","Kelly","Jota"],
                "weaponLoadout":["MP40","M1887"],"tacticalAdvice":"Rotate early."}}"#,
            mode.short_label()
        ))
    }

    fn sensitivity_config(&self, device: &str) -> Result<SensitivityResponse, GenerationError> {
        SensitivityResponse::from_payload(
            r#"{"deviceName":"","settings":{"general":195,"redDot":185,"scope2x":175,
                "scope4x":165,"sniperScope":90,"freeLook":130},
                "fireButtonSize":48,"dpi":640,"notes":"Claw grip."}"#,
            device,
        )
    }
}

struct Session {
    app: App,
    tx: Sender<AppEvent>,
    runner: Runner<TestEventSource, FixedTicker>,
    clipboard: MemoryClipboard,
}

impl Session {
    fn new(store: Persistence) -> Self {
        let (tx, rx) = mpsc::channel();
        let recorder = Recorder::new();
        let clipboard = MemoryClipboard::new();
        let services = Services {
            generator: Arc::new(CannedGenerator),
            authenticator: Arc::new(OfflineAuthenticator),
            redeemer: Arc::new(OfflineRedeemer),
            bridge: DeviceBridge::recording(&recorder),
            clipboard: Box::new(clipboard.clone()),
            clock: Arc::new(ManualClock::new()),
        };
        let app = App::new(
            store,
            Config::default(),
            services,
            JobSender::new(tx.clone()),
            (100, 50),
            None,
        );
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );
        Self {
            app,
            tx,
            runner,
            clipboard,
        }
    }

    fn key(&self, code: KeyCode) {
        self.tx
            .send(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn type_str(&self, s: &str) {
        for c in s.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    /// Pump events until `done` holds or the step budget runs out
    fn run_until(&mut self, done: impl Fn(&App) -> bool) -> bool {
        for _ in 0..2000u32 {
            let ev = self.runner.step();
            self.app.handle(ev);
            if done(&self.app) {
                return true;
            }
        }
        false
    }
}

#[test]
fn sign_in_generate_and_share() {
    let store = Persistence::in_memory();
    let mut s = Session::new(store);

    s.type_str("rusher@ff.gg");
    s.key(KeyCode::Tab);
    s.type_str("secret1");
    s.key(KeyCode::Enter);
    assert!(s.run_until(|app| app.user().is_some()), "sign-in never finished");
    assert_eq!(s.app.user().unwrap().name, "rusher");
    assert_eq!(s.app.tab(), Tab::Aim);

    s.key(KeyCode::Char('/'));
    s.type_str("iPhone 13");
    s.key(KeyCode::Enter);
    assert!(
        s.run_until(|app| app.panels.aim.config().is_some()),
        "sensitivity config never arrived"
    );
    let cfg = s.app.panels.aim.config().unwrap();
    assert_eq!(cfg.device_name, "iPhone 13");
    assert_eq!(cfg.dpi, 640);

    s.key(KeyCode::Char('s'));
    assert!(s.run_until(|app| app.panels.aim.is_copied()));
    let copied = s.clipboard.contents().unwrap();
    assert!(copied.contains("IPHONE 13"));
}

#[test]
fn strategy_brief_arrives_on_second_tab() {
    let store = Persistence::in_memory();
    store.set(
        keys::USER_SESSION,
        r#"{"id":"google_1","name":"FF_Gamer_Google","method":"google","avatar":"G"}"#,
    );
    let mut s = Session::new(store);
    assert!(s.app.user().is_some());

    s.key(KeyCode::Char('2'));
    s.key(KeyCode::Right);
    s.key(KeyCode::Char('g'));
    assert!(
        s.run_until(|app| app.panels.strategy.result().is_some()),
        "brief never arrived"
    );
    assert_eq!(s.app.tab(), Tab::Strategy);
    assert_eq!(s.app.panels.strategy.mode, GameMode::ClashSquad);
    assert_eq!(s.app.panels.strategy.result().unwrap().title, "Clash Plan");
    assert_eq!(s.app.store().get(keys::ACTIVE_TAB).as_deref(), Some("strategy"));

    s.key(KeyCode::Char('q'));
    assert!(s.run_until(|app| app.should_quit()));
}

#[test]
fn tab_survives_restart_on_shared_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    {
        let store = Persistence::open_or_memory(&path);
        store.set(
            keys::USER_SESSION,
            r#"{"id":"phone_1","name":"User_4567","method":"phone","avatar":"P"}"#,
        );
        let mut s = Session::new(store);
        s.key(KeyCode::Char('3'));
        assert!(s.run_until(|app| app.tab() == Tab::Settings));
    }
    let s = Session::new(Persistence::open_or_memory(&path));
    assert_eq!(s.app.tab(), Tab::Settings);
    assert_eq!(s.app.user().unwrap().name, "User_4567");
}
