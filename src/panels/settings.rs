//! System tools, code redemption and the about page.

use crossterm::event::{KeyCode, KeyEvent};
use std::time::Duration;

use super::redeem::RedeemPanel;
use super::{is_char, Ctx, PanelAction};
use crate::haptics::HapticPattern;
use crate::store::keys;
use crate::timer::{fire_if_due, Timeout};

pub const TOGGLE_ACTIVATION: Duration = Duration::from_millis(800);
pub const NOTICE_FOR: Duration = Duration::from_millis(2500);
pub const CACHE_CLEARED: &str = "Game cache cleared.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum SettingsTab {
    #[default]
    #[strum(serialize = "Config")]
    System,
    #[strum(serialize = "Redeem")]
    Redeem,
    #[strum(serialize = "About")]
    About,
}

impl SettingsTab {
    pub const ALL: [SettingsTab; 3] = [SettingsTab::System, SettingsTab::Redeem, SettingsTab::About];
}

/// A switch that takes a moment to come on and goes off at once
#[derive(Debug, Clone)]
pub struct Toggle {
    pub label: &'static str,
    pub description: &'static str,
    on: bool,
    activating: Option<Timeout>,
}

impl Toggle {
    fn new(label: &'static str, description: &'static str) -> Self {
        Self {
            label,
            description,
            on: false,
            activating: None,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_activating(&self) -> bool {
        self.activating.is_some()
    }

    /// Returns false while activation is pending
    fn flip(&mut self, now: Duration) -> bool {
        if self.activating.is_some() {
            return false;
        }
        if self.on {
            self.on = false;
        } else {
            self.activating = Some(Timeout::new(TOGGLE_ACTIVATION, now));
        }
        true
    }

    /// True when activation completed on this poll
    fn poll(&mut self, now: Duration) -> bool {
        if fire_if_due(&mut self.activating, now) {
            self.on = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
pub struct SettingsPanel {
    tab: SettingsTab,
    toggles: [Toggle; 3],
    selected: usize,
    confirm_reset: bool,
    notice: Option<(String, Timeout)>,
    pub redeem: RedeemPanel,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self {
            tab: SettingsTab::System,
            toggles: [
                Toggle::new("FF Game Mode", "Prioritize CPU/GPU for Free Fire"),
                Toggle::new("Network Boost", "Reduce ping via DNS optimized routing"),
                Toggle::new("Gaming DND", "Block banners during gameplay"),
            ],
            selected: 0,
            confirm_reset: false,
            notice: None,
            redeem: RedeemPanel::default(),
        }
    }
}

impl SettingsPanel {
    pub fn tab(&self) -> SettingsTab {
        self.tab
    }

    pub fn toggles(&self) -> &[Toggle] {
        &self.toggles
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn confirming_reset(&self) -> bool {
        self.confirm_reset
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// True while typed characters go to the redeem code
    pub fn captures_text(&self) -> bool {
        self.tab == SettingsTab::Redeem
    }

    pub fn has_overlay(&self) -> bool {
        self.confirm_reset
    }

    pub fn set_tab(&mut self, tab: SettingsTab) {
        self.tab = tab;
        self.confirm_reset = false;
    }

    pub fn flip_toggle(&mut self, index: usize, ctx: &mut Ctx) -> bool {
        let now = ctx.now();
        let Some(toggle) = self.toggles.get_mut(index) else {
            return false;
        };
        let flipped = toggle.flip(now);
        if flipped {
            ctx.haptic(HapticPattern::Light);
        }
        flipped
    }

    /// Drops the cached device model and feedback log
    pub fn clear_cache(&mut self, ctx: &mut Ctx) {
        ctx.store.remove(keys::DEVICE_MODEL);
        ctx.store.remove(keys::FEEDBACK_HISTORY);
        ctx.haptic(HapticPattern::Success);
        tracing::info!("cache cleared");
        self.notice = Some((CACHE_CLEARED.to_string(), Timeout::new(NOTICE_FOR, ctx.now())));
    }

    pub fn request_reset(&mut self, ctx: &mut Ctx) {
        self.confirm_reset = true;
        ctx.haptic(HapticPattern::Heavy);
    }

    pub fn tick(&mut self, ctx: &mut Ctx) {
        let now = ctx.now();
        for toggle in self.toggles.iter_mut() {
            if toggle.poll(now) {
                ctx.services.bridge.haptic(HapticPattern::Success);
            }
        }
        if self
            .notice
            .as_ref()
            .map_or(false, |(_, timeout)| timeout.is_due(now))
        {
            self.notice = None;
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> PanelAction {
        if self.confirm_reset {
            if is_char(&key, 'y') || key.code == KeyCode::Enter {
                self.confirm_reset = false;
                ctx.haptic(HapticPattern::Heavy);
                return PanelAction::ResetApp;
            }
            if is_char(&key, 'n') || key.code == KeyCode::Esc {
                self.confirm_reset = false;
            }
            return PanelAction::None;
        }

        match key.code {
            KeyCode::Left => {
                self.set_tab(crate::ai::types::cycle(&SettingsTab::ALL, self.tab, false));
                return PanelAction::None;
            }
            KeyCode::Right => {
                self.set_tab(crate::ai::types::cycle(&SettingsTab::ALL, self.tab, true));
                return PanelAction::None;
            }
            _ => {}
        }

        match self.tab {
            SettingsTab::Redeem => self.redeem.on_key(key, ctx),
            SettingsTab::About => {}
            SettingsTab::System => match key.code {
                KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                KeyCode::Down => self.selected = (self.selected + 1).min(self.toggles.len() - 1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let index = self.selected;
                    self.flip_toggle(index, ctx);
                }
                _ if is_char(&key, 'c') => self.clear_cache(ctx),
                _ if is_char(&key, 'r') => self.request_reset(ctx),
                _ if is_char(&key, 'l') => {
                    ctx.haptic(HapticPattern::Medium);
                    return PanelAction::Logout;
                }
                _ => {}
            },
        }
        PanelAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::Harness;
    use crate::feedback::{self, FeedbackPanel, Vote};

    fn key(c: char) -> KeyEvent {
        KeyEvent::from(KeyCode::Char(c))
    }

    #[test]
    fn toggle_on_waits_for_activation_off_is_immediate() {
        let mut h = Harness::new();
        let mut panel = SettingsPanel::default();
        assert!(panel.flip_toggle(1, &mut h.ctx()));
        assert!(panel.toggles()[1].is_activating());
        assert!(!panel.flip_toggle(1, &mut h.ctx()));

        h.clock.advance(Duration::from_millis(799));
        panel.tick(&mut h.ctx());
        assert!(!panel.toggles()[1].is_on());
        h.clock.advance(Duration::from_millis(1));
        panel.tick(&mut h.ctx());
        assert!(panel.toggles()[1].is_on());
        assert_eq!(h.recorder.last_vibration(), Some(HapticPattern::Success));

        assert!(panel.flip_toggle(1, &mut h.ctx()));
        assert!(!panel.toggles()[1].is_on());
        assert!(!panel.toggles()[1].is_activating());
    }

    #[test]
    fn clear_cache_removes_device_and_feedback_only() {
        let mut h = Harness::new();
        h.store.set(keys::DEVICE_MODEL, "Pixel 8");
        h.store.set(keys::ACTIVE_TAB, "settings");
        feedback::record(&h.store, FeedbackPanel::Aim, Vote::Up, 1);
        let mut panel = SettingsPanel::default();
        panel.on_key(key('c'), &mut h.ctx());

        assert_eq!(h.store.get(keys::DEVICE_MODEL), None);
        assert!(feedback::history(&h.store).is_empty());
        assert_eq!(h.store.get(keys::ACTIVE_TAB).as_deref(), Some("settings"));
        assert_eq!(panel.notice(), Some(CACHE_CLEARED));
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut h = Harness::new();
        let mut panel = SettingsPanel::default();
        assert_eq!(panel.on_key(key('r'), &mut h.ctx()), PanelAction::None);
        assert!(panel.confirming_reset());
        assert_eq!(panel.on_key(key('n'), &mut h.ctx()), PanelAction::None);
        assert!(!panel.confirming_reset());

        panel.on_key(key('r'), &mut h.ctx());
        assert_eq!(panel.on_key(key('y'), &mut h.ctx()), PanelAction::ResetApp);
    }

    #[test]
    fn logout_and_sub_tabs() {
        let mut h = Harness::new();
        let mut panel = SettingsPanel::default();
        assert_eq!(panel.on_key(key('l'), &mut h.ctx()), PanelAction::Logout);

        panel.on_key(KeyEvent::from(KeyCode::Right), &mut h.ctx());
        assert_eq!(panel.tab(), SettingsTab::Redeem);
        assert!(panel.captures_text());
        // Letters now go to the code field
        assert_eq!(panel.on_key(key('l'), &mut h.ctx()), PanelAction::None);
        assert_eq!(panel.redeem.form().code(), "L");

        panel.on_key(KeyEvent::from(KeyCode::Left), &mut h.ctx());
        panel.on_key(KeyEvent::from(KeyCode::Left), &mut h.ctx());
        assert_eq!(panel.tab(), SettingsTab::About);
    }
}
