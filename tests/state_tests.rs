//! Startup registry wiring

use grid_copilot::application::cancel::CancelToken;
use grid_copilot::application::classifier::Strategy;
use grid_copilot::domain::model::{Intent, Query};
use grid_copilot::infrastructure::config::{parse_config, Config};
use grid_copilot::state::AppState;

fn keyword_config() -> Config {
    let mut config = Config::default();
    config.classifier.strategy = Strategy::Keyword;
    config
}

#[tokio::test]
async fn test_registry_builds_every_tier() {
    let state = AppState::build(keyword_config()).await.unwrap();

    assert_eq!(state.pipeline.pivot(), "en");
    assert_eq!(state.pipeline.classifier().strategy(), Strategy::Keyword);
    assert_eq!(state.synthesis.tier().engine_ids(), vec!["indic-parler", "piper"]);
    assert_eq!(state.transcription.tier().engine_ids(), vec!["whisper-service"]);
    assert_eq!(state.synthesis.tier().eligible("ta"), vec!["indic-parler"]);
    assert_eq!(state.synthesis.tier().eligible("hi"), vec!["piper"]);
}

#[tokio::test]
async fn test_generative_strategy_builds_offline() {
    let state = AppState::build(Config::default()).await.unwrap();
    assert_eq!(state.pipeline.classifier().strategy(), Strategy::Generative);
}

#[tokio::test]
async fn test_guidance_needs_no_backend() {
    let state = AppState::build(keyword_config()).await.unwrap();

    let response = state
        .pipeline
        .process(&Query::new("Tell me a joke", "en"), &CancelToken::new())
        .await;

    assert_eq!(response.intent, Intent::Unclassified);
    assert!(response.response.starts_with("Intent: Others"));
}

#[tokio::test]
async fn test_role_gate_applies_before_any_call() {
    let state = AppState::build(keyword_config()).await.unwrap();

    let query = Query::new("Any theft in ward 9?", "en").with_role("ROLE_GUEST");
    let response = state.pipeline.process(&query, &CancelToken::new()).await;

    assert_eq!(response.intent, Intent::TheftDetection);
    assert!(response.response.starts_with("Access Denied"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = parse_config(
        r#"
[[translation.engines]]
id = "mt"
kind = "http"
"#,
    )
    .unwrap();

    assert!(AppState::build(config).await.is_err());
}
