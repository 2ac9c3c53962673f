use super::http::transport;
use crate::domain::error::CoreError;
use crate::domain::model::{CapabilityResult, GenerationRequest, TranslationRequest};
use crate::domain::traits::{language_supported, CapabilityEngine, GenerationEngine};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: &'a str,
    from_lang: &'a str,
    to_lang: &'a str,
}

#[derive(Deserialize)]
struct TranslateReply {
    translated_text: String,
}

/// Speech-processing service translation endpoint.
pub struct HttpTranslationEngine {
    id: String,
    client: Client,
    url: String,
    languages: Vec<String>,
}

impl HttpTranslationEngine {
    pub fn new(id: impl Into<String>, client: Client, url: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            client,
            url: url.into(),
            languages,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String, CoreError> {
        let body = TranslateBody {
            text: &request.text,
            from_lang: &request.source,
            to_lang: &request.target,
        };

        let reply = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .json::<TranslateReply>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;

        Ok(reply.translated_text)
    }
}

#[async_trait]
impl CapabilityEngine<TranslationRequest, String> for HttpTranslationEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &TranslationRequest) -> CapabilityResult<String> {
        match self.translate(input).await {
            Ok(text) if !text.trim().is_empty() => CapabilityResult::success(&self.id, text),
            Ok(_) => CapabilityResult::failure(&self.id, "empty translation"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}

/// Prompted translation through a generative backend.
pub struct GenerativeTranslationEngine {
    id: String,
    generator: Arc<GenerationEngine>,
    languages: Vec<String>,
}

impl GenerativeTranslationEngine {
    pub fn new(id: impl Into<String>, generator: Arc<GenerationEngine>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            generator,
            languages,
        }
    }

    fn prompt(request: &TranslationRequest) -> String {
        let source = if request.source.eq_ignore_ascii_case("auto") {
            "the detected language".to_string()
        } else {
            format!("'{}'", request.source)
        };
        format!(
            "Translate the following text from {} to '{}'. \
             Reply with the translation only, no notes or quotes.\n\nText: {}",
            source, request.target, request.text
        )
    }
}

#[async_trait]
impl CapabilityEngine<TranslationRequest, String> for GenerativeTranslationEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        language_supported(&self.languages, descriptor)
    }

    async fn invoke(&self, input: &TranslationRequest) -> CapabilityResult<String> {
        let request = GenerationRequest {
            prompt: Self::prompt(input),
            temperature: 0.0,
        };
        let result = self.generator.invoke(&request).await;
        match result.payload {
            Some(text) => CapabilityResult::success(&self.id, text.trim().to_string()),
            None => CapabilityResult::failure(
                &self.id,
                result.error.unwrap_or_else(|| "generation failed".to_string()),
            ),
        }
    }
}
