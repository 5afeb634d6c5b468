//! Sensitivity generator, presets, game-assist overlays and the reaction
//! trainer.

use crossterm::event::{KeyCode, KeyEvent};
use std::time::Duration;

use super::{is_char, Ctx, PanelAction, Tab, TextInput};
use crate::ai::SensitivityResponse;
use crate::error::{GenerationError, ValidationError};
use crate::feedback::{self, FeedbackPanel, Vote, VoteSlot};
use crate::haptics::{HapticPattern, ASSIST_NOTIFICATION_BODY, ASSIST_NOTIFICATION_TITLE};
use crate::history::TrainerLog;
use crate::input::{Point, PointerEvent, PointerPhase};
use crate::macro_tap::MacroTapSimulator;
use crate::overlay::{
    AnchorMode, DragRelease, Draggable, Position, Viewport, ASSIST_HANDLE_SIZE, MACRO_TARGET_SIZE,
    SAFE_ZONE,
};
use crate::presets::PresetList;
use crate::runtime::JobResult;
use crate::store::{keys, Persistence};
use crate::timer::{fire_if_due, Timeout};
use crate::trainer::{ReactionTrainer, TapOutcome, TargetPosition, TrainerState};

pub const CONFIG_FAILED: &str = "CONFIG FAILED";
pub const MIN_DEVICE_CHARS: usize = 3;
pub const COPIED_FOR: Duration = Duration::from_millis(2500);
pub const NOTICE_FOR: Duration = Duration::from_millis(2500);
pub const BOOST_FOR: Duration = Duration::from_millis(1500);

/// Half the side of the trainer target's hit box
pub const TRAINER_TARGET_RADIUS_PX: f64 = 32.0;

pub const CROSSHAIR_COLORS: [&str; 6] = ["red", "green", "yellow", "cyan", "fuchsia", "white"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Crosshair {
    #[default]
    Off,
    Dot,
    Cross,
    Circle,
}

impl Crosshair {
    pub const ALL: [Crosshair; 4] = [
        Crosshair::Off,
        Crosshair::Dot,
        Crosshair::Cross,
        Crosshair::Circle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Crosshair::Off => "OFF",
            Crosshair::Dot => "V.1",
            Crosshair::Cross => "V.2",
            Crosshair::Circle => "V.3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AimModal {
    SavePreset(TextInput),
    Presets { selected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grab {
    Assist,
    Macro,
}

/// Centre of the trainer target in viewport pixels
pub fn trainer_target_center(target: TargetPosition, viewport: Viewport) -> Point {
    Point::new(
        target.x_pct / 100.0 * viewport.width,
        target.y_pct / 100.0 * viewport.height,
    )
}

pub fn trainer_hit(target: TargetPosition, viewport: Viewport, p: Point) -> bool {
    let c = trainer_target_center(target, viewport);
    (p.x - c.x).abs() <= TRAINER_TARGET_RADIUS_PX && (p.y - c.y).abs() <= TRAINER_TARGET_RADIUS_PX
}

pub fn validate_device(device: &str) -> Result<&str, ValidationError> {
    let trimmed = device.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDeviceModel);
    }
    if trimmed.chars().count() < MIN_DEVICE_CHARS {
        return Err(ValidationError::DeviceModelTooShort);
    }
    Ok(trimmed)
}

fn default_assist(viewport: Viewport) -> Position {
    Position::new(viewport.width - 80.0, viewport.height - 200.0)
}

fn default_macro(viewport: Viewport) -> Position {
    Position::new(viewport.width / 2.0, viewport.height / 2.0)
}

fn load_position(store: &Persistence, key: &str) -> Option<Position> {
    store.get_json::<Position>(key).filter(Position::is_finite)
}

pub struct AimPanel {
    device: TextInput,
    editing: bool,
    loading: bool,
    config: Option<SensitivityResponse>,
    error: Option<String>,
    copied: Option<Timeout>,
    notice: Option<(String, Timeout)>,
    vote: VoteSlot,
    presets: PresetList,
    modal: Option<AimModal>,

    assist_open: bool,
    stealth: bool,
    crosshair: Crosshair,
    crosshair_color: usize,
    macro_tap: MacroTapSimulator,
    tapping: bool,
    boost: Option<Timeout>,
    assist: Draggable,
    macro_target: Draggable,
    grab: Option<Grab>,
    viewport: Viewport,

    trainer: Option<ReactionTrainer>,
    trainer_duration_secs: u32,
    trainer_log: Option<TrainerLog>,
}

impl std::fmt::Debug for AimPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AimPanel")
            .field("device", &self.device.value())
            .field("loading", &self.loading)
            .field("assist_open", &self.assist_open)
            .field("trainer", &self.trainer)
            .finish_non_exhaustive()
    }
}

impl AimPanel {
    pub fn new(
        store: &Persistence,
        viewport: Viewport,
        default_cps: u8,
        trainer_duration_secs: u32,
        trainer_log: Option<TrainerLog>,
    ) -> Self {
        let device = store.get(keys::DEVICE_MODEL).unwrap_or_default();
        let assist_pos = load_position(store, keys::ASSIST_POS).unwrap_or_else(|| default_assist(viewport));
        let macro_pos = load_position(store, keys::MACRO_POS).unwrap_or_else(|| default_macro(viewport));

        let mut panel = Self {
            device: TextInput::new(device),
            editing: false,
            loading: false,
            config: None,
            error: None,
            copied: None,
            notice: None,
            vote: VoteSlot::default(),
            presets: PresetList::load(store),
            modal: None,
            assist_open: false,
            stealth: false,
            crosshair: Crosshair::Off,
            crosshair_color: 0,
            macro_tap: MacroTapSimulator::new(default_cps),
            tapping: false,
            boost: None,
            assist: Draggable::new(assist_pos, ASSIST_HANDLE_SIZE, AnchorMode::TopLeft),
            macro_target: Draggable::new(macro_pos, MACRO_TARGET_SIZE, AnchorMode::Center),
            grab: None,
            viewport,
            trainer: None,
            trainer_duration_secs,
            trainer_log,
        };
        panel.reclamp(store);
        panel
    }

    fn reclamp(&mut self, store: &Persistence) {
        if self.assist.reclamp(self.viewport, SAFE_ZONE) {
            store.set_json(keys::ASSIST_POS, &self.assist.position());
        }
        if self.macro_target.reclamp(self.viewport, SAFE_ZONE) {
            store.set_json(keys::MACRO_POS, &self.macro_target.position());
        }
    }

    pub fn resize(&mut self, viewport: Viewport, store: &Persistence, reclamp: bool) {
        self.viewport = viewport;
        if reclamp {
            self.reclamp(store);
        }
    }

    /// Drop every running timer. Called when the tab is left.
    pub fn suspend(&mut self) {
        self.macro_tap.stop();
        self.tapping = false;
        self.boost = None;
        self.copied = None;
        self.notice = None;
        self.trainer = None;
        self.grab = None;
        self.assist.end_drag();
        self.macro_target.end_drag();
    }

    // Accessors used by rendering and tests

    pub fn device(&self) -> &str {
        self.device.value()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn config(&self) -> Option<&SensitivityResponse> {
        self.config.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn vote(&self) -> Option<Vote> {
        self.vote.current()
    }

    pub fn presets(&self) -> &PresetList {
        &self.presets
    }

    pub fn modal(&self) -> Option<&AimModal> {
        self.modal.as_ref()
    }

    pub fn assist_open(&self) -> bool {
        self.assist_open
    }

    pub fn stealth(&self) -> bool {
        self.stealth
    }

    pub fn crosshair(&self) -> Crosshair {
        self.crosshair
    }

    pub fn crosshair_color(&self) -> &'static str {
        CROSSHAIR_COLORS[self.crosshair_color % CROSSHAIR_COLORS.len()]
    }

    pub fn macro_tap(&self) -> &MacroTapSimulator {
        &self.macro_tap
    }

    pub fn is_tapping(&self) -> bool {
        self.tapping
    }

    pub fn is_boosting(&self) -> bool {
        self.boost.is_some()
    }

    pub fn assist(&self) -> &Draggable {
        &self.assist
    }

    pub fn macro_target(&self) -> &Draggable {
        &self.macro_target
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn trainer(&self) -> Option<&ReactionTrainer> {
        self.trainer.as_ref()
    }

    /// True while typed characters belong to a text field
    pub fn captures_text(&self) -> bool {
        self.editing || matches!(self.modal, Some(AimModal::SavePreset(_)))
    }

    /// True while Esc and friends are consumed by an overlay
    pub fn has_overlay(&self) -> bool {
        self.captures_text() || self.modal.is_some() || self.trainer.is_some()
    }

    // Device field and generation

    pub fn set_device(&mut self, value: &str, store: &Persistence) {
        self.device.set(value);
        store.set(keys::DEVICE_MODEL, value);
        self.error = None;
    }

    pub fn generate(&mut self, ctx: &mut Ctx) -> bool {
        if self.loading {
            return false;
        }
        let device = match validate_device(self.device.value()) {
            Ok(d) => d.to_string(),
            Err(e) => {
                self.error = Some(e.to_string());
                ctx.haptic(HapticPattern::Error);
                return false;
            }
        };
        self.loading = true;
        self.error = None;
        self.copied = None;
        self.vote.clear();
        ctx.haptic(HapticPattern::Light);

        let generator = ctx.services.generator.clone();
        tracing::info!(device = %device, "requesting sensitivity config");
        ctx.jobs.spawn("sensitivity", move || {
            JobResult::Sensitivity(generator.sensitivity_config(&device))
        });
        true
    }

    pub fn finish(&mut self, result: Result<SensitivityResponse, GenerationError>, ctx: &mut Ctx) {
        self.loading = false;
        match result {
            Ok(config) => {
                self.config = Some(config);
                ctx.haptic(HapticPattern::Success);
            }
            Err(e) => {
                tracing::warn!(error = %e, "sensitivity config failed");
                self.error = Some(CONFIG_FAILED.to_string());
                ctx.haptic(HapticPattern::Error);
            }
        }
    }

    pub fn adjust_dpi(&mut self, steps: i32) {
        if let Some(config) = self.config.as_mut() {
            config.adjust_dpi(steps);
        }
    }

    pub fn share(&mut self, ctx: &mut Ctx) -> bool {
        let Some(config) = self.config.as_ref() else {
            return false;
        };
        let text = config.share_text();
        match ctx.services.clipboard.copy(&text) {
            Ok(()) => {
                self.copied = Some(Timeout::new(COPIED_FOR, ctx.now()));
                ctx.haptic(HapticPattern::Success);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "clipboard copy failed");
                self.copied = None;
                ctx.haptic(HapticPattern::Error);
                false
            }
        }
    }

    pub fn cast_vote(&mut self, vote: Vote, ctx: &mut Ctx) {
        if self.config.is_none() || !self.vote.cast(vote) {
            return;
        }
        ctx.haptic(match vote {
            Vote::Up => HapticPattern::Success,
            Vote::Down => HapticPattern::Medium,
        });
        let now = ctx.now_ms();
        feedback::record(ctx.store, FeedbackPanel::Aim, vote, now);
    }

    // Presets

    pub fn open_save(&mut self, ctx: &mut Ctx) {
        if let Some(config) = self.config.as_ref() {
            self.modal = Some(AimModal::SavePreset(TextInput::new(config.device_name.clone())));
            ctx.haptic(HapticPattern::Light);
        }
    }

    pub fn confirm_save(&mut self, ctx: &mut Ctx) -> Result<(), ValidationError> {
        let (Some(AimModal::SavePreset(name)), Some(config)) = (self.modal.as_ref(), self.config.as_ref())
        else {
            return Ok(());
        };
        let now = ctx.now_ms();
        let saved = self.presets.save(name.value(), config.clone(), now).map(|_| ());
        match saved {
            Ok(()) => {
                self.presets.persist(ctx.store);
                self.modal = None;
                ctx.haptic(HapticPattern::Success);
                Ok(())
            }
            Err(e) => {
                ctx.haptic(HapticPattern::Error);
                Err(e)
            }
        }
    }

    pub fn open_presets(&mut self, ctx: &mut Ctx) {
        self.modal = Some(AimModal::Presets { selected: 0 });
        ctx.haptic(HapticPattern::Light);
    }

    pub fn load_preset(&mut self, index: usize, ctx: &mut Ctx) -> bool {
        let Some(preset) = self.presets.get(index) else {
            return false;
        };
        let config = preset.config.clone();
        self.set_device(&config.device_name, ctx.store);
        self.config = Some(config);
        self.modal = None;
        ctx.haptic(HapticPattern::Success);
        true
    }

    pub fn delete_preset(&mut self, index: usize, ctx: &mut Ctx) -> bool {
        let Some(id) = self.presets.get(index).map(|p| p.id) else {
            return false;
        };
        self.presets.delete(id);
        self.presets.persist(ctx.store);
        if let Some(AimModal::Presets { selected }) = self.modal.as_mut() {
            *selected = (*selected).min(self.presets.len().saturating_sub(1));
        }
        ctx.haptic(HapticPattern::Medium);
        true
    }

    // Game assist

    pub fn toggle_assist(&mut self, ctx: &mut Ctx) {
        if !self.assist_open && self.stealth {
            self.stealth = false;
        }
        self.assist_open = !self.assist_open;
        ctx.haptic(HapticPattern::Light);
    }

    pub fn cycle_crosshair(&mut self, ctx: &mut Ctx) {
        self.crosshair = crate::ai::types::cycle(&Crosshair::ALL, self.crosshair, true);
        ctx.haptic(HapticPattern::Light);
    }

    pub fn cycle_crosshair_color(&mut self, ctx: &mut Ctx) {
        self.crosshair_color = (self.crosshair_color + 1) % CROSSHAIR_COLORS.len();
        ctx.haptic(HapticPattern::Light);
    }

    pub fn toggle_macro(&mut self, ctx: &mut Ctx) -> bool {
        let on = self.macro_tap.toggle(ctx.now());
        if !on {
            self.tapping = false;
        }
        ctx.haptic(if on {
            HapticPattern::ToggleOn
        } else {
            HapticPattern::ToggleOff
        });
        on
    }

    pub fn change_cps(&mut self, delta: i16, ctx: &mut Ctx) {
        let cps = (i16::from(self.macro_tap.cps()) + delta).clamp(0, i16::from(u8::MAX)) as u8;
        let now = ctx.now();
        self.macro_tap.set_cps(cps, now);
    }

    pub fn toggle_stealth(&mut self, ctx: &mut Ctx) {
        self.stealth = !self.stealth;
        ctx.haptic(HapticPattern::Medium);
    }

    /// Refused while a boost is already running
    pub fn boost(&mut self, ctx: &mut Ctx) -> bool {
        if self.boost.is_some() {
            return false;
        }
        self.boost = Some(Timeout::new(BOOST_FOR, ctx.now()));
        ctx.haptic(HapticPattern::Medium);
        true
    }

    pub fn send_notification(&mut self, ctx: &mut Ctx) {
        ctx.haptic(HapticPattern::Light);
        let delivered = ctx
            .services
            .bridge
            .notify(ASSIST_NOTIFICATION_TITLE, ASSIST_NOTIFICATION_BODY);
        let msg = if delivered {
            "Notification sent"
        } else {
            "Notifications unavailable here"
        };
        self.notice = Some((msg.to_string(), Timeout::new(NOTICE_FOR, ctx.now())));
    }

    // Trainer

    pub fn open_trainer(&mut self, ctx: &mut Ctx) {
        if self.trainer.is_none() {
            self.trainer = Some(ReactionTrainer::new(
                ctx.services.clock.clone(),
                self.trainer_duration_secs,
            ));
        }
        self.assist_open = false;
        ctx.haptic(HapticPattern::Light);
    }

    pub fn close_trainer(&mut self) {
        self.trainer = None;
    }

    /// Start or restart. Ignored while a run is in progress.
    pub fn start_trainer(&mut self, ctx: &mut Ctx) {
        if let Some(t) = self.trainer.as_mut() {
            if t.state() != TrainerState::Playing {
                t.start();
                ctx.haptic(HapticPattern::Success);
            }
        }
    }

    pub fn trainer_tap(&mut self, p: Point, ctx: &mut Ctx) -> Option<TapOutcome> {
        let viewport = self.viewport;
        let t = self.trainer.as_mut()?;
        let hit = trainer_hit(t.target(), viewport, p);
        let outcome = t.tap(hit)?;
        ctx.haptic(match outcome {
            TapOutcome::Hit { .. } => HapticPattern::Hit,
            TapOutcome::Miss => HapticPattern::Miss,
        });
        Some(outcome)
    }

    // Event handling

    pub fn tick(&mut self, ctx: &mut Ctx) {
        let now = ctx.now();
        fire_if_due(&mut self.copied, now);
        if self
            .notice
            .as_ref()
            .map_or(false, |(_, timeout)| timeout.is_due(now))
        {
            self.notice = None;
        }
        if fire_if_due(&mut self.boost, now) {
            ctx.haptic(HapticPattern::Success);
        }
        self.tapping = self.macro_tap.tick(now);

        let finished = self.trainer.as_mut().map_or(false, ReactionTrainer::tick);
        if finished {
            ctx.haptic(HapticPattern::Success);
            if let (Some(t), Some(log)) = (self.trainer.as_ref(), self.trainer_log.as_ref()) {
                log.record(&t.summary());
            }
        }
    }

    pub fn on_pointer(&mut self, ev: PointerEvent, ctx: &mut Ctx) {
        if self.trainer.is_some() {
            if ev.phase == PointerPhase::Down {
                self.trainer_tap(ev.point, ctx);
            }
            return;
        }
        if self.modal.is_some() {
            return;
        }

        match ev.phase {
            PointerPhase::Down => {
                if self.assist.contains(ev.point) {
                    self.assist.begin_drag(ev.point);
                    self.grab = Some(Grab::Assist);
                } else if self.macro_tap.is_active() && self.macro_target.contains(ev.point) {
                    self.macro_target.begin_drag(ev.point);
                    self.grab = Some(Grab::Macro);
                }
            }
            PointerPhase::Move => {
                let (widget, key) = match self.grab {
                    Some(Grab::Assist) => (&mut self.assist, keys::ASSIST_POS),
                    Some(Grab::Macro) => (&mut self.macro_target, keys::MACRO_POS),
                    None => return,
                };
                if let Some(pos) = widget.update_drag(ev.point, self.viewport, SAFE_ZONE) {
                    ctx.store.set_json(key, &pos);
                }
            }
            PointerPhase::Up => match self.grab.take() {
                Some(Grab::Assist) => {
                    if let Some(DragRelease::Tap) = self.assist.end_drag() {
                        self.toggle_assist(ctx);
                    }
                }
                Some(Grab::Macro) => {
                    self.macro_target.end_drag();
                }
                None => {}
            },
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> PanelAction {
        if self.trainer.is_some() {
            match key.code {
                KeyCode::Esc => self.close_trainer(),
                KeyCode::Enter | KeyCode::Char(' ') => self.start_trainer(ctx),
                _ => {}
            }
            return PanelAction::None;
        }

        if let Some(modal) = self.modal.as_mut() {
            match modal {
                AimModal::SavePreset(name) => match key.code {
                    KeyCode::Esc => self.modal = None,
                    KeyCode::Enter => {
                        let _ = self.confirm_save(ctx);
                    }
                    _ => {
                        name.handle_key(key);
                    }
                },
                AimModal::Presets { selected } => match key.code {
                    KeyCode::Esc => self.modal = None,
                    KeyCode::Up => *selected = selected.saturating_sub(1),
                    KeyCode::Down => {
                        *selected = (*selected + 1).min(self.presets.len().saturating_sub(1))
                    }
                    KeyCode::Enter => {
                        let idx = *selected;
                        self.load_preset(idx, ctx);
                    }
                    KeyCode::Delete | KeyCode::Char('x') => {
                        let idx = *selected;
                        self.delete_preset(idx, ctx);
                    }
                    _ => {}
                },
            }
            return PanelAction::None;
        }

        if self.editing {
            match key.code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => {
                    self.editing = false;
                    self.generate(ctx);
                }
                _ => {
                    if self.device.handle_key(key) {
                        let value = self.device.value().to_string();
                        self.set_device(&value, ctx.store);
                    }
                }
            }
            return PanelAction::None;
        }

        match key.code {
            KeyCode::Enter => {
                self.generate(ctx);
            }
            KeyCode::Esc if self.assist_open => self.assist_open = false,
            _ if is_char(&key, '/') || is_char(&key, 'i') => self.editing = true,
            _ if is_char(&key, 'g') => {
                self.generate(ctx);
            }
            _ if is_char(&key, 's') => {
                self.share(ctx);
            }
            _ if is_char(&key, 'p') => self.open_save(ctx),
            _ if is_char(&key, 'l') => self.open_presets(ctx),
            _ if is_char(&key, '[') => self.adjust_dpi(-1),
            _ if is_char(&key, ']') => self.adjust_dpi(1),
            _ if is_char(&key, 'u') => self.cast_vote(Vote::Up, ctx),
            _ if is_char(&key, 'd') => self.cast_vote(Vote::Down, ctx),
            _ if is_char(&key, 'a') => self.toggle_assist(ctx),
            _ if is_char(&key, 'x') => self.cycle_crosshair(ctx),
            _ if is_char(&key, 'c') => self.cycle_crosshair_color(ctx),
            _ if is_char(&key, 'm') => {
                self.toggle_macro(ctx);
            }
            _ if is_char(&key, '<') => self.change_cps(-1, ctx),
            _ if is_char(&key, '>') => self.change_cps(1, ctx),
            _ if is_char(&key, 'h') => self.toggle_stealth(ctx),
            _ if is_char(&key, 'b') => {
                self.boost(ctx);
            }
            _ if is_char(&key, 'o') => self.send_notification(ctx),
            _ if is_char(&key, 't') => self.open_trainer(ctx),
            _ if is_char(&key, ',') => {
                ctx.haptic(HapticPattern::Light);
                return PanelAction::SwitchTab(Tab::Settings);
            }
            _ => {}
        }
        PanelAction::None
    }
}
