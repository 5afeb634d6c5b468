// Drives the Gemini client against a local mock server.

use std::time::Duration;

use aimhq::ai::{GameMode, GeminiClient, Generator, PlayStyle};
use aimhq::error::GenerationError;
use assert_matches::assert_matches;
use serde_json::json;

const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(server: &mockito::Server) -> GeminiClient {
    GeminiClient::new("test-key", server.url(), "gemini-2.5-flash", Duration::from_secs(5)).unwrap()
}

/// Wrap `text` the way the service wraps the first candidate
fn envelope(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

#[test]
fn brief_is_parsed_from_first_candidate() {
    let mut server = mockito::Server::new();
    let payload = json!({
        "title": "Operation Hot Drop",
        "characterCombination": ["Alok", "Chrono", "Kelly", "Jota"],
        "weaponLoadout": ["MP40", "M1887"],
        "tacticalAdvice": "Land at Clock Tower and rotate early."
    })
    .to_string();
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(&payload))
        .create();

    let brief = client(&server)
        .tactical_brief(GameMode::BattleRoyale, PlayStyle::Rusher)
        .unwrap();
    mock.assert();
    assert_eq!(brief.title, "Operation Hot Drop");
    assert_eq!(brief.character_combination.len(), 4);
    assert_eq!(brief.weapon_loadout, vec!["MP40", "M1887"]);
}

#[test]
fn http_error_maps_to_status() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", PATH)
        .with_status(429)
        .with_body("quota exceeded")
        .create();

    let err = client(&server)
        .tactical_brief(GameMode::ClashSquad, PlayStyle::Igl)
        .unwrap_err();
    assert_matches!(err, GenerationError::Status { status: 429, .. });
}

#[test]
fn no_candidates_is_empty() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create();

    let err = client(&server).sensitivity_config("Pixel 8").unwrap_err();
    assert_matches!(err, GenerationError::Empty);
}

#[test]
fn malformed_candidate_text_is_rejected() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(envelope("this is not json"))
        .create();

    let err = client(&server).sensitivity_config("Pixel 8").unwrap_err();
    assert_matches!(err, GenerationError::Malformed(_));
}

#[test]
fn brief_with_three_characters_is_invalid() {
    let mut server = mockito::Server::new();
    let payload = json!({
        "title": "Short Squad",
        "characterCombination": ["Alok", "Chrono", "Kelly"],
        "weaponLoadout": ["AWM"],
        "tacticalAdvice": "Hold the ridge."
    })
    .to_string();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(envelope(&payload))
        .create();

    let err = client(&server)
        .tactical_brief(GameMode::LoneWolf, PlayStyle::Recon)
        .unwrap_err();
    assert_matches!(err, GenerationError::Invalid(_));
}

#[test]
fn sensitivity_values_are_clamped_into_range() {
    let mut server = mockito::Server::new();
    let payload = json!({
        "deviceName": "iPhone 13",
        "settings": {
            "general": 250,
            "redDot": 187.6,
            "scope2x": 175,
            "scope4x": 160,
            "sniperScope": -12,
            "freeLook": 140
        },
        "fireButtonSize": 130,
        "dpi": 120,
        "notes": "  Use 4 finger claw.  "
    })
    .to_string();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(envelope(&payload))
        .create();

    let cfg = client(&server).sensitivity_config("iPhone 13").unwrap();
    assert_eq!(cfg.device_name, "iPhone 13");
    assert_eq!(cfg.settings.general, 200);
    assert_eq!(cfg.settings.red_dot, 188);
    assert_eq!(cfg.settings.sniper_scope, 0);
    assert_eq!(cfg.fire_button_size, 100);
    assert_eq!(cfg.dpi, 300);
    assert_eq!(cfg.notes, "Use 4 finger claw.");
    for (_, v) in cfg.settings.rows() {
        assert!(v <= 200);
    }
}

#[test]
fn blank_device_name_falls_back_to_request() {
    let mut server = mockito::Server::new();
    let payload = json!({
        "deviceName": " ",
        "settings": {
            "general": 190, "redDot": 180, "scope2x": 170,
            "scope4x": 160, "sniperScope": 80, "freeLook": 120
        },
        "fireButtonSize": 45,
        "dpi": 720,
        "notes": ""
    })
    .to_string();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(envelope(&payload))
        .create();

    let cfg = client(&server).sensitivity_config("Redmi Note 12").unwrap();
    assert_eq!(cfg.device_name, "Redmi Note 12");
    assert_eq!(cfg.dpi, 720);
}
