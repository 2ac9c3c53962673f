//! Defensive parsing of generative classifier output

use grid_copilot::application::classifier::parser::{parse_intent, ParseStage};
use grid_copilot::domain::model::Intent;

#[test]
fn test_strict_json() {
    let parsed = parse_intent(r#"{"intent": "LOAD_FORECASTING"}"#);
    assert_eq!(parsed.intent, Intent::LoadForecasting);
    assert_eq!(parsed.stage, ParseStage::Strict);
    assert_eq!(parsed.stage.confidence(), 1.0);
}

#[test]
fn test_json_inside_code_fence_and_prose() {
    let raw = "Sure! Here is the classification:\n```json\n{\"intent\": \"THEFT_DETECTION\"}\n```";
    let parsed = parse_intent(raw);
    assert_eq!(parsed.intent, Intent::TheftDetection);
    assert_eq!(parsed.stage, ParseStage::Strict);
}

#[test]
fn test_other_maps_to_unclassified() {
    let parsed = parse_intent(r#"{"intent": "OTHER"}"#);
    assert_eq!(parsed.intent, Intent::Unclassified);
    assert_eq!(parsed.stage, ParseStage::Strict);
}

#[test]
fn test_broken_json_recovers_field() {
    let parsed = parse_intent(r#"{"intent": "ASSET_MONITORING",}"#);
    assert_eq!(parsed.intent, Intent::AssetMonitoring);
    assert_eq!(parsed.stage, ParseStage::Field);
    assert_eq!(parsed.stage.confidence(), 0.8);
}

#[test]
fn test_unquoted_field_with_spaces() {
    let parsed = parse_intent("intent: theft detection");
    assert_eq!(parsed.intent, Intent::TheftDetection);
    assert_eq!(parsed.stage, ParseStage::Field);
}

#[test]
fn test_near_miss_name_uses_keywords() {
    let parsed = parse_intent(r#"{"intent": "LOAD_PREDICTION"}"#);
    assert_eq!(parsed.intent, Intent::LoadForecasting);
    assert_eq!(parsed.stage, ParseStage::Heuristic);
    assert_eq!(parsed.stage.confidence(), 0.5);
}

#[test]
fn test_free_text_heuristic() {
    let parsed = parse_intent("This looks like a transformer question to me.");
    assert_eq!(parsed.intent, Intent::AssetMonitoring);
    assert_eq!(parsed.stage, ParseStage::Heuristic);
}

#[test]
fn test_theft_wins_over_forecast_in_heuristic() {
    let parsed = parse_intent("a forecast of theft losses");
    assert_eq!(parsed.intent, Intent::TheftDetection);
}

#[test]
fn test_unparseable_defaults_to_unclassified() {
    for raw in ["", "I am not sure.", "{}", "```\n```"] {
        let parsed = parse_intent(raw);
        assert_eq!(parsed.intent, Intent::Unclassified, "input: {:?}", raw);
        assert_eq!(parsed.stage, ParseStage::Default);
        assert_eq!(parsed.stage.confidence(), 0.0);
    }
}
