// Wire shapes for the chat front-end. Field names follow what the web
// client already sends and reads.
use crate::domain::model::{Intent, PipelineResponse, Query, TranscriptionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub role: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl From<ProcessRequest> for Query {
    fn from(request: ProcessRequest) -> Self {
        Query {
            text: request.query,
            language: request.language,
            role: request.role.filter(|r| !r.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub query: String,
    pub intent: Intent,
    pub response: String,
    pub language: String,
    pub translated_response: Option<String>,
    pub english_response: Option<String>,
    pub degraded: bool,
}

impl From<PipelineResponse> for ProcessResponse {
    fn from(response: PipelineResponse) -> Self {
        let degraded = response.is_degraded();
        Self {
            query: response.query,
            intent: response.intent,
            response: response.response,
            language: response.language,
            translated_response: response.translated_response,
            english_response: response.english_response,
            degraded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub text: String,
    pub original_text: String,
    pub language: String,
}

impl From<TranscriptionResult> for TranscriptionResponse {
    fn from(result: TranscriptionResult) -> Self {
        Self {
            success: !result.text.is_empty(),
            text: result.text,
            original_text: result.original_text,
            language: result.language,
        }
    }
}
