//! Request parameters and validated response payloads.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum GameMode {
    #[strum(serialize = "Battle Royale")]
    BattleRoyale,
    #[strum(serialize = "Clash Squad")]
    ClashSquad,
    #[strum(serialize = "Lone Wolf")]
    LoneWolf,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::BattleRoyale, GameMode::ClashSquad, GameMode::LoneWolf];

    /// First word of the label, used on the compact selector
    pub fn short_label(&self) -> &'static str {
        match self {
            GameMode::BattleRoyale => "Battle",
            GameMode::ClashSquad => "Clash",
            GameMode::LoneWolf => "Lone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum PlayStyle {
    #[strum(serialize = "Rusher (Aggressive)")]
    Rusher,
    #[strum(serialize = "Support (Healer/Sniper)")]
    Support,
    #[strum(serialize = "IGL (Tactical)")]
    Igl,
    #[strum(serialize = "Flanker (Stealth)")]
    Flanker,
    #[strum(serialize = "Recon (Information Gathering)")]
    Recon,
    #[strum(serialize = "Demolition (Area Denial)")]
    Demolition,
}

impl PlayStyle {
    pub const ALL: [PlayStyle; 6] = [
        PlayStyle::Rusher,
        PlayStyle::Support,
        PlayStyle::Igl,
        PlayStyle::Flanker,
        PlayStyle::Recon,
        PlayStyle::Demolition,
    ];
}

/// Step through a fixed option list, wrapping at both ends
pub fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let len = all.len();
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    all[next]
}

pub const CHARACTER_SLOTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResponse {
    pub title: String,
    pub character_combination: Vec<String>,
    pub weapon_loadout: Vec<String>,
    pub tactical_advice: String,
}

impl StrategyResponse {
    /// Parse and check a service payload
    pub fn from_payload(text: &str) -> Result<Self, GenerationError> {
        let raw: StrategyResponse = serde_json::from_str(text)?;
        raw.validate()
    }

    pub fn validate(mut self) -> Result<Self, GenerationError> {
        self.title = self.title.trim().to_string();
        self.tactical_advice = self.tactical_advice.trim().to_string();
        trim_all(&mut self.character_combination);
        trim_all(&mut self.weapon_loadout);

        if self.title.is_empty() {
            return Err(GenerationError::Invalid("missing title".into()));
        }
        if self.character_combination.len() != CHARACTER_SLOTS
            || self.character_combination.iter().any(String::is_empty)
        {
            return Err(GenerationError::Invalid(format!(
                "expected {} character names, got {}",
                CHARACTER_SLOTS,
                self.character_combination.len()
            )));
        }
        if self.weapon_loadout.is_empty() || self.weapon_loadout.iter().any(String::is_empty) {
            return Err(GenerationError::Invalid("empty weapon loadout".into()));
        }
        if self.tactical_advice.is_empty() {
            return Err(GenerationError::Invalid("missing tactical advice".into()));
        }
        Ok(self)
    }
}

fn trim_all(items: &mut [String]) {
    for item in items.iter_mut() {
        *item = item.trim().to_string();
    }
}

pub const SENSITIVITY_MAX: u16 = 200;
pub const FIRE_BUTTON_MAX: u8 = 100;
pub const DPI_MIN: u16 = 300;
pub const DPI_MAX: u16 = 1600;
pub const DPI_STEP: u16 = 10;

/// Accept any JSON number, round it and pin it into `[lo, hi]`
fn clamped_number<'de, D: Deserializer<'de>>(d: D, lo: f64, hi: f64) -> Result<f64, D::Error> {
    let v = f64::deserialize(d)?;
    if !v.is_finite() {
        return Err(serde::de::Error::custom("non-finite number"));
    }
    Ok(v.round().clamp(lo, hi))
}

fn sensitivity<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
    clamped_number(d, 0.0, f64::from(SENSITIVITY_MAX)).map(|v| v as u16)
}

fn fire_button<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    clamped_number(d, 0.0, f64::from(FIRE_BUTTON_MAX)).map(|v| v as u8)
}

fn dpi<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
    clamped_number(d, f64::from(DPI_MIN), f64::from(DPI_MAX)).map(|v| v as u16)
}

/// In-game sensitivity sliders, each 0..=200
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivitySettings {
    #[serde(deserialize_with = "sensitivity")]
    pub general: u16,
    #[serde(deserialize_with = "sensitivity")]
    pub red_dot: u16,
    #[serde(deserialize_with = "sensitivity")]
    pub scope2x: u16,
    #[serde(deserialize_with = "sensitivity")]
    pub scope4x: u16,
    #[serde(deserialize_with = "sensitivity")]
    pub sniper_scope: u16,
    #[serde(deserialize_with = "sensitivity")]
    pub free_look: u16,
}

impl SensitivitySettings {
    /// Label/value pairs in display order
    pub fn rows(&self) -> [(&'static str, u16); 6] {
        [
            ("General", self.general),
            ("Red Dot", self.red_dot),
            ("2x Scope", self.scope2x),
            ("4x Scope", self.scope4x),
            ("Sniper Scope", self.sniper_scope),
            ("Free Look", self.free_look),
        ]
    }
}

/// A device sensitivity profile.
///
/// Numeric fields are rounded and clamped while deserializing, so stored
/// presets and fresh service payloads both come out in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResponse {
    pub device_name: String,
    pub settings: SensitivitySettings,
    #[serde(deserialize_with = "fire_button")]
    pub fire_button_size: u8,
    #[serde(deserialize_with = "dpi")]
    pub dpi: u16,
    #[serde(default)]
    pub notes: String,
}

impl SensitivityResponse {
    /// Parse and check a service payload. A blank device name falls back to
    /// the model that was asked for.
    pub fn from_payload(text: &str, requested_device: &str) -> Result<Self, GenerationError> {
        let mut raw: SensitivityResponse = serde_json::from_str(text)?;
        raw.device_name = raw.device_name.trim().to_string();
        if raw.device_name.is_empty() {
            raw.device_name = requested_device.trim().to_string();
        }
        if raw.device_name.is_empty() {
            return Err(GenerationError::Invalid("missing device name".into()));
        }
        raw.notes = raw.notes.trim().to_string();
        Ok(raw)
    }

    /// Move the DPI slider by `steps` notches of 10, staying in range
    pub fn adjust_dpi(&mut self, steps: i32) {
        let next = i32::from(self.dpi) + steps * i32::from(DPI_STEP);
        self.dpi = next.clamp(i32::from(DPI_MIN), i32::from(DPI_MAX)) as u16;
    }

    /// Plain-text block for the clipboard
    pub fn share_text(&self) -> String {
        let s = &self.settings;
        format!(
            "[FF COMMAND CENTER]\nAUTO HEADSHOT INTEL // {}\n---------------------------\nGeneral: {}\nRed Dot: {}\n2x: {} | 4x: {}\nSniper: {}\nFree Look: {}\n---------------------------\nFire Button: {}% | DPI: {}",
            self.device_name.to_uppercase(),
            s.general,
            s.red_dot,
            s.scope2x,
            s.scope4x,
            s.sniper_scope,
            s.free_look,
            self.fire_button_size,
            self.dpi
        )
    }
}
