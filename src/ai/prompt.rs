//! Prompt texts and response schemas for the two generation requests.

use serde_json::{json, Value};

use super::types::{GameMode, PlayStyle};

pub const FALLBACK_DEVICE: &str = "Generic High-End Phone";

pub fn tactical_brief(mode: GameMode, style: PlayStyle) -> String {
    format!(
        "Generate a detailed Free Fire (mobile game) tactical brief for a player.
Game Mode: {mode}
Play Style: {style}

Provide:
1. A cool, tactical operation name (Title).
2. The best 4-character skill combination for this specific role and mode.
3. Recommended primary and secondary weapon loadout.
4. A concise paragraph of tactical advice on how to execute this playstyle effectively in the chosen mode.
"
    )
}

/// The device name actually sent, after trimming
pub fn device_or_fallback(device_model: &str) -> &str {
    match device_model.trim() {
        "" => FALLBACK_DEVICE,
        trimmed => trimmed,
    }
}

pub fn sensitivity_config(device_model: &str) -> String {
    let device = device_or_fallback(device_model);
    format!(
        "Generate \"Auto Headshot\" style sensitivity settings for Free Fire on a '{device}'.
These settings should be high-performance, optimized for drag headshots.
Provide integer values between 0-200 for sensitivities (matching Free Fire Max scale).
Provide an optimal fire button size as a percentage (usually between 40-60).
Provide a recommended DPI value between 300 and 1600 (e.g., 400-1440 depending on device class).
Provide a short, \"pro\" tip note.
"
    )
}

pub fn tactical_brief_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A tactical operation name, e.g., 'Operation Silent Fury'"
            },
            "characterCombination": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 4 character names suitable for the strategy."
            },
            "weaponLoadout": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Recommended primary and secondary weapons."
            },
            "tacticalAdvice": {
                "type": "STRING",
                "description": "Concise strategic advice paragraph."
            }
        },
        "required": ["title", "characterCombination", "weaponLoadout", "tacticalAdvice"]
    })
}

pub fn sensitivity_schema() -> Value {
    let slider = |description: &str| json!({ "type": "NUMBER", "description": description });
    json!({
        "type": "OBJECT",
        "properties": {
            "deviceName": { "type": "STRING" },
            "settings": {
                "type": "OBJECT",
                "properties": {
                    "general": slider("General sensitivity (150-200 range)"),
                    "redDot": slider("Red Dot sensitivity (140-200 range)"),
                    "scope2x": slider("2x Scope sensitivity (130-200 range)"),
                    "scope4x": slider("4x Scope sensitivity (120-180 range)"),
                    "sniperScope": slider("Sniper Scope sensitivity (80-150 range)"),
                    "freeLook": slider("Free Look sensitivity (100-180 range)")
                },
                "required": ["general", "redDot", "scope2x", "scope4x", "sniperScope", "freeLook"]
            },
            "fireButtonSize": slider("Recommended fire button percentage size"),
            "dpi": slider("Recommended device DPI setting"),
            "notes": {
                "type": "STRING",
                "description": "Short pro-tip for headshots on this device."
            }
        },
        "required": ["deviceName", "settings", "fireButtonSize", "dpi", "notes"]
    })
}
