//! Local-command engines driven through temp files
#![cfg(unix)]

use grid_copilot::application::selector::EngineTier;
use grid_copilot::domain::model::{AudioClip, Capability, SynthesisRequest, TranscriptionRequest};
use grid_copilot::domain::traits::CapabilityEngine;
use grid_copilot::infrastructure::local::{CommandSynthesisEngine, CommandTranscriptionEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

#[tokio::test]
async fn test_synthesis_reads_output_file() {
    let engine = CommandSynthesisEngine::new("sh", "sh", args(&["-c", "cat > {output}"]), Vec::new());
    let request = SynthesisRequest {
        text: "peak load at six".to_string(),
        language: "en".to_string(),
    };

    let result = engine.invoke(&request).await;

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.engine, "sh");
    assert_eq!(result.payload.unwrap().bytes, b"peak load at six".to_vec());
}

#[tokio::test]
async fn test_synthesis_substitutes_language() {
    let engine = CommandSynthesisEngine::new(
        "sh",
        "sh",
        args(&["-c", "printf {language} > {output}"]),
        Vec::new(),
    );
    let request = SynthesisRequest {
        text: String::new(),
        language: "ta".to_string(),
    };

    let result = engine.invoke(&request).await;
    assert_eq!(result.payload.unwrap().bytes, b"ta".to_vec());
}

#[tokio::test]
async fn test_failing_command_is_failed_result() {
    let engine = CommandSynthesisEngine::new("false", "false", Vec::new(), Vec::new());
    let request = SynthesisRequest {
        text: "hello".to_string(),
        language: "en".to_string(),
    };

    let result = engine.invoke(&request).await;

    assert!(!result.is_success());
    assert_eq!(result.engine, "false");
    assert!(result.error.is_some());
}

/// Shell engine that records its `{output}` path in `marker` before running `tail`.
fn recording_engine(marker: &Path, tail: &str) -> CommandSynthesisEngine {
    let script = format!("echo {{output}} > {}; {}", marker.display(), tail);
    CommandSynthesisEngine::new("sh", "sh", args(&["-c", &script]), Vec::new())
}

fn recorded_path(marker: &Path) -> PathBuf {
    PathBuf::from(std::fs::read_to_string(marker).unwrap().trim())
}

#[tokio::test]
async fn test_output_file_removed_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let engine = recording_engine(&marker, "printf x > {output}; exit 1");
    let request = SynthesisRequest {
        text: "hello".to_string(),
        language: "en".to_string(),
    };

    let result = engine.invoke(&request).await;

    assert!(!result.is_success());
    let output = recorded_path(&marker);
    assert!(output.to_string_lossy().contains("copilot-"));
    assert!(!output.exists(), "{} left behind", output.display());
}

#[tokio::test]
async fn test_output_file_removed_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let engine = recording_engine(&marker, "sleep 10");
    let tier = EngineTier::<SynthesisRequest, AudioClip>::new(Capability::Synthesis, Duration::from_millis(500))
        .with_engine(Arc::new(engine));
    let request = SynthesisRequest {
        text: "hello".to_string(),
        language: "en".to_string(),
    };

    let result = tier.select("en", &request).await;

    assert!(!result.is_success());
    let output = recorded_path(&marker);
    assert!(!output.exists(), "{} left behind", output.display());
}

#[tokio::test]
async fn test_missing_program_is_failed_result() {
    let engine = CommandSynthesisEngine::new("ghost", "definitely-not-installed-tts", Vec::new(), Vec::new());
    let request = SynthesisRequest {
        text: "hello".to_string(),
        language: "en".to_string(),
    };

    assert!(!engine.invoke(&request).await.is_success());
}

#[tokio::test]
async fn test_transcription_reads_stdout() {
    let engine = CommandTranscriptionEngine::new("cat", "cat", args(&["{input}"]), Vec::new());
    let request = TranscriptionRequest {
        audio: b"  check feeder twelve \n".to_vec(),
        format: "txt".to_string(),
        language: Some("en".to_string()),
    };

    let result = engine.invoke(&request).await;

    let transcript = result.payload.unwrap();
    assert_eq!(transcript.text, "check feeder twelve");
    assert_eq!(transcript.language.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_empty_transcript_is_failure() {
    let engine = CommandTranscriptionEngine::new("true", "true", Vec::new(), Vec::new());
    let request = TranscriptionRequest {
        audio: vec![1, 2, 3],
        format: "wav".to_string(),
        language: None,
    };

    assert!(!engine.invoke(&request).await.is_success());
}

#[test]
fn test_language_eligibility() {
    let engine = CommandSynthesisEngine::new("piper", "piper", Vec::new(), args(&["en", "hi"]));
    assert!(engine.supports("hi"));
    assert!(engine.supports("EN"));
    assert!(!engine.supports("ta"));
}
