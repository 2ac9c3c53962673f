use super::http::transport;
use crate::domain::error::CoreError;
use crate::domain::model::{
    AudioClip, CapabilityResult, SynthesisRequest, Transcript, TranscriptionRequest,
};
use crate::domain::traits::{language_supported, CapabilityEngine};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct SynthesizeBody<'a> {
    text: &'a str,
    language: &'a str,
}

/// Remote TTS endpoint answering with raw audio bytes.
pub struct HttpSynthesisEngine {
    id: String,
    client: Client,
    url: String,
    languages: Vec<String>,
}

impl HttpSynthesisEngine {
    pub fn new(id: impl Into<String>, client: Client, url: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            client,
            url: url.into(),
            languages,
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, CoreError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SynthesizeBody {
                text: &request.text,
                language: &request.language,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/wav")
            .to_string();
        let bytes = response.bytes().await.map_err(transport)?;

        Ok(AudioClip {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[async_trait]
impl CapabilityEngine<SynthesisRequest, AudioClip> for HttpSynthesisEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &SynthesisRequest) -> CapabilityResult<AudioClip> {
        match self.synthesize(input).await {
            Ok(clip) if !clip.bytes.is_empty() => CapabilityResult::success(&self.id, clip),
            Ok(_) => CapabilityResult::failure(&self.id, "empty audio"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct TranscribeReply {
    text: String,
    #[serde(default, alias = "language")]
    detected_language: Option<String>,
}

/// Remote STT endpoint. Audio goes in the body, the language hint in the
/// query string.
pub struct HttpTranscriptionEngine {
    id: String,
    client: Client,
    url: String,
    languages: Vec<String>,
}

impl HttpTranscriptionEngine {
    pub fn new(id: impl Into<String>, client: Client, url: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            client,
            url: url.into(),
            languages,
        }
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcript, CoreError> {
        let mut call = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, format!("audio/{}", request.format))
            .body(request.audio.clone());
        if let Some(language) = &request.language {
            call = call.query(&[("language", language.as_str())]);
        }

        let reply = call
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .json::<TranscribeReply>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;

        Ok(Transcript {
            text: reply.text,
            language: reply.detected_language.or_else(|| request.language.clone()),
        })
    }
}

#[async_trait]
impl CapabilityEngine<TranscriptionRequest, Transcript> for HttpTranscriptionEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &TranscriptionRequest) -> CapabilityResult<Transcript> {
        match self.transcribe(input).await {
            Ok(t) if !t.text.trim().is_empty() => CapabilityResult::success(&self.id, t),
            Ok(_) => CapabilityResult::failure(&self.id, "empty transcript"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}
