use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of request categories. Dispatch is keyed on this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    LoadForecasting,
    TheftDetection,
    AssetMonitoring,
    #[serde(rename = "OTHER")]
    Unclassified,
}

impl Intent {
    /// Declaration order. Keyword matching walks intents in this order.
    pub const ALL: [Intent; 4] = [
        Intent::LoadForecasting,
        Intent::TheftDetection,
        Intent::AssetMonitoring,
        Intent::Unclassified,
    ];

    /// Intents that route to a downstream domain service.
    pub const DOMAIN: [Intent; 3] = [
        Intent::LoadForecasting,
        Intent::TheftDetection,
        Intent::AssetMonitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LoadForecasting => "LOAD_FORECASTING",
            Intent::TheftDetection => "THEFT_DETECTION",
            Intent::AssetMonitoring => "ASSET_MONITORING",
            Intent::Unclassified => "OTHER",
        }
    }

    /// Human label used in response prefixes and guidance text.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::LoadForecasting => "Load Forecasting",
            Intent::TheftDetection => "Theft Detection",
            Intent::AssetMonitoring => "Asset Monitoring",
            Intent::Unclassified => "Others",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::LoadForecasting => "Ask about power demand predictions",
            Intent::TheftDetection => "Ask about suspicious activity or alerts",
            Intent::AssetMonitoring => "Ask about asset status or alerts",
            Intent::Unclassified => "Everything else",
        }
    }

    /// Config-table key, e.g. `[services.load_forecasting]`.
    pub fn config_key(&self) -> &'static str {
        match self {
            Intent::LoadForecasting => "load_forecasting",
            Intent::TheftDetection => "theft_detection",
            Intent::AssetMonitoring => "asset_monitoring",
            Intent::Unclassified => "other",
        }
    }

    /// Exact match on a normalized name: upper case, `_` for spaces and hyphens.
    pub fn from_name(name: &str) -> Option<Intent> {
        let normalized = name.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "LOAD_FORECASTING" => Some(Intent::LoadForecasting),
            "THEFT_DETECTION" => Some(Intent::TheftDetection),
            "ASSET_MONITORING" => Some(Intent::AssetMonitoring),
            "OTHER" | "UNCLASSIFIED" => Some(Intent::Unclassified),
            _ => None,
        }
    }

    /// Prefix every successful domain answer starts with.
    pub fn response_prefix(&self) -> String {
        format!("Intent: {}\n\n", self.label())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound request. Read-only once built.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub language: String,
    pub role: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn is_auto_language(&self) -> bool {
        self.language.eq_ignore_ascii_case("auto")
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub confidence: f32,
    /// Backend output or matched keyword, for diagnostics only.
    pub raw: Option<String>,
}

impl ClassificationResult {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self {
            intent,
            confidence,
            raw: None,
        }
    }

    pub fn unclassified() -> Self {
        Self::new(Intent::Unclassified, 0.0)
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// Error tag carried by a failed handler outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerErrorKind {
    AccessDenied,
    Transport,
    ServiceFailure,
    Configuration,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct HandlerOutcome {
    pub success: bool,
    pub text: String,
    pub error: Option<HandlerErrorKind>,
}

impl HandlerOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            error: None,
        }
    }

    pub fn failed(kind: HandlerErrorKind, text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
            error: Some(kind),
        }
    }

    pub fn cancelled() -> Self {
        Self::failed(HandlerErrorKind::Cancelled, "Request cancelled.")
    }

    pub fn is_access_denied(&self) -> bool {
        self.error == Some(HandlerErrorKind::AccessDenied)
    }
}

/// Optional step that failed or was skipped without failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    TranslateInFailed,
    TranslateOutFailed,
    Cancelled,
    TimedOut,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResponse {
    pub query: String,
    pub intent: Intent,
    pub response: String,
    pub language: String,
    pub translated_response: Option<String>,
    pub english_response: Option<String>,
    #[serde(skip)]
    pub degradations: Vec<Degradation>,
}

impl PipelineResponse {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Outcome of one capability call. `engine` names who produced it, or the
/// last engine tried when every attempt failed.
#[derive(Debug, Clone)]
pub struct CapabilityResult<T> {
    pub engine: String,
    pub payload: Option<T>,
    pub error: Option<String>,
}

impl<T> CapabilityResult<T> {
    pub fn success(engine: impl Into<String>, payload: T) -> Self {
        Self {
            engine: engine.into(),
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(engine: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            payload: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.payload.is_some()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Translation,
    Synthesis,
    Transcription,
    Generation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Translation => "translation",
            Capability::Synthesis => "synthesis",
            Capability::Transcription => "transcription",
            Capability::Generation => "generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub source: String,
    pub target: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
}

/// Encoded audio, usually WAV.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl AudioClip {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "audio/wav".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Vec<u8>,
    /// File extension hint for engines that need a file on disk.
    pub format: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
}

/// Final output of the transcription service.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub original_text: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
}
