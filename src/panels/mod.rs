//! View state and input handling for each screen.

pub mod aim;
pub mod auth;
pub mod redeem;
pub mod settings;
pub mod strategy;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::app::Services;
use crate::config::Config;
use crate::haptics::HapticPattern;
use crate::runtime::JobSender;
use crate::store::Persistence;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Tab {
    #[default]
    #[strum(serialize = "Aim")]
    Aim,
    #[strum(serialize = "Strategy")]
    Strategy,
    #[strum(serialize = "Settings")]
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Aim, Tab::Strategy, Tab::Settings];

    /// Value written to the store
    pub fn as_key(&self) -> &'static str {
        match self {
            Tab::Aim => "aim",
            Tab::Strategy => "strategy",
            Tab::Settings => "settings",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Tab::ALL.into_iter().find(|t| t.as_key() == raw)
    }

    pub fn next(&self) -> Self {
        crate::ai::types::cycle(&Tab::ALL, *self, true)
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

/// What a panel asks the app to do after handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    None,
    SwitchTab(Tab),
    Logout,
    ResetApp,
}

/// Everything a panel may touch while handling an event
pub struct Ctx<'a> {
    pub store: &'a Persistence,
    pub services: &'a mut Services,
    pub jobs: &'a JobSender,
    pub config: &'a Config,
}

impl<'a> Ctx<'a> {
    /// Monotonic time for timers
    pub fn now(&self) -> Duration {
        self.services.clock.now()
    }

    /// Wall-clock epoch milliseconds for ids and timestamps
    pub fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn haptic(&mut self, pattern: HapticPattern) {
        self.services.bridge.haptic(pattern);
    }
}

/// Single-line text field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    max_chars: Option<usize>,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            max_chars: None,
        }
    }

    pub fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Apply an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                if self
                    .max_chars
                    .map_or(false, |max| self.value.chars().count() >= max)
                {
                    return false;
                }
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }
}

/// A press of `c` without Ctrl
pub fn is_char(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && !key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn tab_keys_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_key(tab.as_key()), Some(tab));
        }
        assert_eq!(Tab::from_key("bogus"), None);
        assert_eq!(Tab::Settings.next(), Tab::Aim);
    }

    #[test]
    fn text_input_edits() {
        let mut input = TextInput::default().with_max_chars(3);
        assert!(input.handle_key(key(KeyCode::Char('a'))));
        assert!(input.handle_key(key(KeyCode::Char('b'))));
        assert!(input.handle_key(key(KeyCode::Char('c'))));
        assert!(!input.handle_key(key(KeyCode::Char('d'))));
        assert_eq!(input.value(), "abc");
        assert!(input.handle_key(key(KeyCode::Backspace)));
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)));
        assert_eq!(input.value(), "ab");
        input.clear();
        assert!(!input.handle_key(key(KeyCode::Backspace)));
    }
}
