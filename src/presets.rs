//! Saved sensitivity configurations.

use serde::{Deserialize, Serialize};

use crate::ai::SensitivityResponse;
use crate::error::ValidationError;
use crate::store::{keys, Persistence};

pub const MAX_PRESETS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub config: SensitivityResponse,
    pub timestamp: i64,
}

/// Most-recent-first list, capped at [`MAX_PRESETS`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetList {
    items: Vec<Preset>,
}

impl PresetList {
    pub fn load(store: &Persistence) -> Self {
        let mut items: Vec<Preset> = store.get_json(keys::PRESETS).unwrap_or_default();
        items.truncate(MAX_PRESETS);
        Self { items }
    }

    pub fn persist(&self, store: &Persistence) {
        store.set_json(keys::PRESETS, &self.items);
    }

    pub fn items(&self) -> &[Preset] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.items.get(index)
    }

    /// Insert at the front. `now_ms` becomes id and timestamp, bumped past
    /// the current maximum id if it would collide.
    pub fn save(
        &mut self,
        name: &str,
        config: SensitivityResponse,
        now_ms: i64,
    ) -> Result<&Preset, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPresetName);
        }
        let max_id = self.items.iter().map(|p| p.id).max();
        let id = match max_id {
            Some(max) if max >= now_ms => max + 1,
            _ => now_ms,
        };
        self.items.insert(
            0,
            Preset {
                id,
                name: name.to_string(),
                config,
                timestamp: now_ms,
            },
        );
        self.items.truncate(MAX_PRESETS);
        Ok(&self.items[0])
    }

    /// Returns whether anything was removed
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        self.items.len() != before
    }
}
