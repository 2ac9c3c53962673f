//! Tiered engine selection

mod common;

use common::ScriptedEngine;
use grid_copilot::application::selector::EngineTier;
use grid_copilot::domain::model::{Capability, TranslationRequest};
use std::sync::Arc;
use std::time::Duration;

fn tier() -> EngineTier<TranslationRequest, String> {
    EngineTier::new(Capability::Translation, Duration::from_secs(1))
}

fn request() -> TranslationRequest {
    TranslationRequest::new("नमस्ते", "hi", "en")
}

#[tokio::test]
async fn test_falls_back_to_second_engine() {
    let first = Arc::new(ScriptedEngine::<TranslationRequest, String>::failing("primary"));
    let second = Arc::new(ScriptedEngine::new("secondary", |_: &TranslationRequest| {
        Some("hello".to_string())
    }));

    let tier = tier()
        .with_engine(first.clone())
        .with_engine(second.clone());

    let result = tier.select("hi", &request()).await;

    assert!(result.is_success());
    assert_eq!(result.engine, "secondary");
    assert_eq!(result.payload.as_deref(), Some("hello"));
    assert!(result.error.is_none());
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn test_first_success_stops_the_walk() {
    let first = Arc::new(ScriptedEngine::new("primary", |_: &TranslationRequest| {
        Some("hello".to_string())
    }));
    let second = Arc::new(ScriptedEngine::new("secondary", |_: &TranslationRequest| {
        Some("hi there".to_string())
    }));

    let tier = tier()
        .with_engine(first.clone())
        .with_engine(second.clone());

    let result = tier.select("hi", &request()).await;

    assert_eq!(result.engine, "primary");
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn test_all_failed_names_last_engine() {
    let tier = tier()
        .with_engine(Arc::new(ScriptedEngine::<TranslationRequest, String>::failing("a")))
        .with_engine(Arc::new(ScriptedEngine::<TranslationRequest, String>::failing("b")));

    let result = tier.select("hi", &request()).await;

    assert!(!result.is_success());
    assert_eq!(result.engine, "b");
    assert_eq!(result.error.as_deref(), Some("all translation engines failed"));
}

#[tokio::test]
async fn test_empty_tier_fails_without_panicking() {
    let tier = tier();

    let result = tier.select("hi", &request()).await;

    assert!(tier.is_empty());
    assert!(!result.is_success());
    assert_eq!(result.engine, "none");
}

#[tokio::test]
async fn test_eligibility_filters_by_language() {
    let indic = Arc::new(
        ScriptedEngine::new("indic", |_: &TranslationRequest| Some("indic".to_string()))
            .languages(&["bn", "ta"]),
    );
    let general = Arc::new(
        ScriptedEngine::new("general", |_: &TranslationRequest| Some("general".to_string()))
            .languages(&["en", "hi"]),
    );

    let tier = tier()
        .with_engine(indic.clone())
        .with_engine(general.clone());

    assert_eq!(tier.eligible("hi"), vec!["general"]);
    assert_eq!(tier.eligible("ta"), vec!["indic"]);

    let result = tier.select("hi", &request()).await;
    assert_eq!(result.engine, "general");
    assert_eq!(indic.calls(), 0);
}

#[tokio::test]
async fn test_no_eligible_engine_uses_whole_tier() {
    let indic = Arc::new(
        ScriptedEngine::new("indic", |_: &TranslationRequest| Some("indic".to_string()))
            .languages(&["bn"]),
    );
    let tier = tier()
        .with_engine(indic.clone());

    assert_eq!(tier.eligible("fr"), vec!["indic"]);

    let result = tier.select("fr", &request()).await;
    assert!(result.is_success());
    assert_eq!(indic.calls(), 1);
}

#[tokio::test]
async fn test_slow_engine_times_out_and_next_runs() {
    let slow = Arc::new(
        ScriptedEngine::new("slow", |_: &TranslationRequest| Some("late".to_string()))
            .delayed(Duration::from_secs(5)),
    );
    let fast = Arc::new(ScriptedEngine::new("fast", |_: &TranslationRequest| {
        Some("on time".to_string())
    }));

    let mut tier = tier();
    tier.push(slow.clone(), Duration::from_millis(50));
    tier.push(fast.clone(), Duration::from_secs(1));

    let started = std::time::Instant::now();
    let result = tier.select("hi", &request()).await;

    assert_eq!(result.engine, "fast");
    assert_eq!(result.payload.as_deref(), Some("on time"));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_engine_ids_keep_configured_order() {
    let tier = EngineTier::<TranslationRequest, String>::new(Capability::Transcription, Duration::from_secs(1))
        .with_engine(Arc::new(ScriptedEngine::<TranslationRequest, String>::failing("z")))
        .with_engine(Arc::new(ScriptedEngine::<TranslationRequest, String>::failing("a")));

    assert_eq!(tier.engine_ids(), vec!["z", "a"]);
    assert_eq!(tier.len(), 2);
    assert_eq!(tier.capability(), Capability::Transcription);
}
