// Local executables (piper-style TTS, whisper-style STT) driven through
// temp files. Temp files are held as `TempPath` and removed on drop,
// including when the selector abandons a timed-out attempt.
use crate::domain::error::CoreError;
use crate::domain::model::{
    AudioClip, CapabilityResult, SynthesisRequest, Transcript, TranscriptionRequest,
};
use crate::domain::traits::{language_supported, CapabilityEngine};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const INPUT: &str = "{input}";
const OUTPUT: &str = "{output}";
const LANGUAGE: &str = "{language}";

fn expand_args(args: &[String], input: Option<&Path>, output: Option<&Path>, language: &str) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut arg = arg.replace(LANGUAGE, language);
            if let Some(path) = input {
                arg = arg.replace(INPUT, &path.to_string_lossy());
            }
            if let Some(path) = output {
                arg = arg.replace(OUTPUT, &path.to_string_lossy());
            }
            arg
        })
        .collect()
}

fn temp_path(suffix: &str) -> Result<tempfile::TempPath, CoreError> {
    Ok(tempfile::Builder::new()
        .prefix("copilot-")
        .suffix(suffix)
        .tempfile()?
        .into_temp_path())
}

/// Text on stdin, audio written to `{output}`.
pub struct CommandSynthesisEngine {
    id: String,
    program: String,
    args: Vec<String>,
    languages: Vec<String>,
}

impl CommandSynthesisEngine {
    pub fn new(id: impl Into<String>, program: impl Into<String>, args: Vec<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args,
            languages,
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, CoreError> {
        let output = temp_path(".wav")?;
        let args = expand_args(&self.args, None, Some(&*output), &request.language);
        debug!(engine = %self.id, program = %self.program, "Running synthesis command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let finished = child.wait_with_output().await?;
        if !finished.status.success() {
            return Err(CoreError::Transport(format!(
                "{} exited with {}: {}",
                self.program,
                finished.status,
                String::from_utf8_lossy(&finished.stderr).trim()
            )));
        }

        let bytes = tokio::fs::read(&output).await?;
        Ok(AudioClip::wav(bytes))
    }
}

#[async_trait]
impl CapabilityEngine<SynthesisRequest, AudioClip> for CommandSynthesisEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &SynthesisRequest) -> CapabilityResult<AudioClip> {
        match self.synthesize(input).await {
            Ok(clip) if !clip.bytes.is_empty() => CapabilityResult::success(&self.id, clip),
            Ok(_) => CapabilityResult::failure(&self.id, "command produced no audio"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}

/// Audio written to `{input}`, transcript read from stdout.
pub struct CommandTranscriptionEngine {
    id: String,
    program: String,
    args: Vec<String>,
    languages: Vec<String>,
}

impl CommandTranscriptionEngine {
    pub fn new(id: impl Into<String>, program: impl Into<String>, args: Vec<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args,
            languages,
        }
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcript, CoreError> {
        let input = temp_path(&format!(".{}", request.format))?;
        tokio::fs::write(&input, &request.audio).await?;

        let language = request.language.as_deref().unwrap_or("auto");
        let args = expand_args(&self.args, Some(&*input), None, language);
        debug!(engine = %self.id, program = %self.program, "Running transcription command");

        let finished = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !finished.status.success() {
            return Err(CoreError::Transport(format!(
                "{} exited with {}: {}",
                self.program,
                finished.status,
                String::from_utf8_lossy(&finished.stderr).trim()
            )));
        }

        Ok(Transcript {
            text: String::from_utf8_lossy(&finished.stdout).trim().to_string(),
            language: request.language.clone(),
        })
    }
}

#[async_trait]
impl CapabilityEngine<TranscriptionRequest, Transcript> for CommandTranscriptionEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &TranscriptionRequest) -> CapabilityResult<Transcript> {
        match self.transcribe(input).await {
            Ok(t) if !t.text.is_empty() => CapabilityResult::success(&self.id, t),
            Ok(_) => CapabilityResult::failure(&self.id, "command produced no transcript"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}
