use super::http::transport;
use crate::domain::error::CoreError;
use crate::domain::model::{CapabilityResult, GenerationRequest};
use crate::domain::traits::{CapabilityEngine, Embedder};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct EmbedBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedReply {
    embeddings: Vec<Vec<f32>>,
}

/// Non-streaming `/api/generate` backend.
pub struct OllamaGenerator {
    id: String,
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            id: format!("ollama:{}", model),
            client,
            endpoint: endpoint.into(),
            model,
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let body = GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
            },
        };

        let reply = self
            .client
            .post(format!("{}/api/generate", self.endpoint.trim_end_matches('/')))
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .json::<GenerateReply>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;

        Ok(reply.response)
    }
}

#[async_trait]
impl CapabilityEngine<GenerationRequest, String> for OllamaGenerator {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, _descriptor: &str) -> bool {
        true
    }

    async fn invoke(&self, input: &GenerationRequest) -> CapabilityResult<String> {
        match self.generate(input).await {
            Ok(text) if !text.trim().is_empty() => CapabilityResult::success(&self.id, text),
            Ok(_) => CapabilityResult::failure(&self.id, "empty completion"),
            Err(e) => CapabilityResult::failure(&self.id, e.to_string()),
        }
    }
}

/// `/api/embed` backend for the similarity classifier.
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        debug!(model = %self.model, count = texts.len(), "Embedding texts");
        let body = EmbedBody {
            model: &self.model,
            input: texts,
        };

        let reply = self
            .client
            .post(format!("{}/api/embed", self.endpoint.trim_end_matches('/')))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .json::<EmbedReply>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;

        Ok(reply.embeddings)
    }
}
