use crate::domain::error::CoreError;
use crate::domain::model::{
    AudioClip, CapabilityResult, GenerationRequest, Transcript, TranscriptionRequest,
    SynthesisRequest, TranslationRequest,
};
use async_trait::async_trait;
use serde_json::Value;

/// One backend for one narrow operation.
///
/// Implementations must turn every internal failure into a failed
/// `CapabilityResult`; nothing engine-specific crosses this boundary.
/// Identical input must give identical output.
#[async_trait]
pub trait CapabilityEngine<I, O>: Send + Sync
where
    I: Sync,
    O: Send,
{
    /// Stable identifier, logged on every attempt.
    fn id(&self) -> &str;

    /// Whether this engine is eligible for a language or content descriptor.
    fn supports(&self, descriptor: &str) -> bool;

    async fn invoke(&self, input: &I) -> CapabilityResult<O>;
}

pub type TranslationEngine = dyn CapabilityEngine<TranslationRequest, String>;
pub type SynthesisEngine = dyn CapabilityEngine<SynthesisRequest, AudioClip>;
pub type TranscriptionEngine = dyn CapabilityEngine<TranscriptionRequest, Transcript>;
pub type GenerationEngine = dyn CapabilityEngine<GenerationRequest, String>;

/// Sentence embedding backend used by the similarity classifier.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError>;
}

/// Downstream analytic service: POST `{prompt}` and return the JSON body.
#[async_trait]
pub trait DomainService: Send + Sync {
    fn name(&self) -> &str;

    async fn ask(&self, prompt: &str) -> Result<Value, CoreError>;
}

/// Shared language-set eligibility. An empty set accepts everything.
pub fn language_supported(languages: &[String], descriptor: &str) -> bool {
    languages.is_empty() || languages.iter().any(|l| l.eq_ignore_ascii_case(descriptor))
}
