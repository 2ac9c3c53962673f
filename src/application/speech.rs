// Speech synthesis and transcription on top of the tiered selector.
use crate::application::pipeline::{translate_with, TranslationTier};
use crate::application::selector::EngineTier;
use crate::domain::model::{
    AudioClip, CapabilityResult, SynthesisRequest, Transcript, TranscriptionRequest,
    TranscriptionResult,
};
use std::sync::Arc;
use tracing::{info, warn};

pub const SILENCE_ENGINE: &str = "fallback:silence";

pub struct SynthesisService {
    tier: EngineTier<SynthesisRequest, AudioClip>,
    silence: AudioClip,
}

impl SynthesisService {
    /// `silence` is built at startup so the terminal fallback cannot fail.
    pub fn new(tier: EngineTier<SynthesisRequest, AudioClip>, silence: AudioClip) -> Self {
        Self { tier, silence }
    }

    pub fn tier(&self) -> &EngineTier<SynthesisRequest, AudioClip> {
        &self.tier
    }

    /// Always yields audio. When every engine fails the pre-built silent
    /// clip is returned under the `fallback:silence` engine id.
    pub async fn synthesize(&self, text: &str, language: &str) -> CapabilityResult<AudioClip> {
        let preview: String = text.chars().take(30).collect();
        info!(text = %preview, language, "Speech synthesis requested");

        let request = SynthesisRequest {
            text: text.to_string(),
            language: language.to_string(),
        };
        let result = self.tier.select(language, &request).await;
        if result.is_success() {
            return result;
        }

        warn!("All synthesis engines failed, returning silence");
        CapabilityResult::success(SILENCE_ENGINE, self.silence.clone())
    }
}

pub struct TranscriptionService {
    tier: EngineTier<TranscriptionRequest, Transcript>,
    translator: Arc<TranslationTier>,
    pivot: String,
}

impl TranscriptionService {
    pub fn new(
        tier: EngineTier<TranscriptionRequest, Transcript>,
        translator: Arc<TranslationTier>,
        pivot: impl Into<String>,
    ) -> Self {
        Self {
            tier,
            translator,
            pivot: pivot.into(),
        }
    }

    pub fn tier(&self) -> &EngineTier<TranscriptionRequest, Transcript> {
        &self.tier
    }

    /// Transcribes in the spoken language, then brings the text into the
    /// pivot language. `original_text` keeps the native transcript.
    pub async fn transcribe(&self, request: &TranscriptionRequest) -> TranscriptionResult {
        let descriptor = request.language.as_deref().unwrap_or("auto");
        let result = self.tier.select(descriptor, request).await;

        let Some(transcript) = result.payload else {
            warn!("All transcription engines failed, returning empty transcript");
            return TranscriptionResult {
                text: String::new(),
                original_text: String::new(),
                language: descriptor.to_string(),
            };
        };

        let language = transcript
            .language
            .clone()
            .or_else(|| request.language.clone())
            .unwrap_or_else(|| self.pivot.clone());
        info!(engine = %result.engine, detected = %language, "Transcription complete");

        if language.eq_ignore_ascii_case(&self.pivot) {
            return TranscriptionResult {
                text: transcript.text.clone(),
                original_text: transcript.text,
                language,
            };
        }

        let text = translate_with(&self.translator, &self.pivot, &transcript.text, &language, &self.pivot)
            .await
            .unwrap_or_else(|| {
                warn!("Transcript translation failed, keeping native text");
                transcript.text.clone()
            });

        TranscriptionResult {
            text,
            original_text: transcript.text,
            language,
        }
    }
}
