use super::parser::{parse_intent, ParseStage};
use crate::application::cancel::CancelToken;
use crate::application::selector::EngineTier;
use crate::domain::model::{ClassificationResult, GenerationRequest, Intent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Post-parse correction for a known confusion: when the backend answers
/// `from` but the query contains one of `keywords`, the answer becomes `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordOverride {
    pub from: Intent,
    pub to: Intent,
    pub keywords: Vec<String>,
}

impl KeywordOverride {
    fn apply(&self, intent: Intent, query_lower: &str) -> Option<Intent> {
        if intent != self.from {
            return None;
        }
        self.keywords
            .iter()
            .any(|k| query_lower.contains(&k.to_lowercase()))
            .then_some(self.to)
    }
}

/// Backends tend to read "forecast" as load forecasting even when the
/// query is about projected theft losses.
pub fn default_overrides() -> Vec<KeywordOverride> {
    vec![KeywordOverride {
        from: Intent::LoadForecasting,
        to: Intent::TheftDetection,
        keywords: vec!["theft".into(), "tamper".into(), "stolen".into()],
    }]
}

/// Prompt-and-parse classifier over a generative backend tier.
pub struct GenerativeClassifier {
    backend: EngineTier<GenerationRequest, String>,
    overrides: Vec<KeywordOverride>,
    temperature: f32,
    pivot_language: String,
}

impl GenerativeClassifier {
    pub fn new(
        backend: EngineTier<GenerationRequest, String>,
        overrides: Vec<KeywordOverride>,
        temperature: f32,
        pivot_language: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            overrides,
            temperature,
            pivot_language: pivot_language.into(),
        }
    }

    pub async fn classify(&self, text: &str, cancel: &CancelToken) -> ClassificationResult {
        if cancel.is_cancelled() {
            debug!("Cancelled before generative classification");
            return ClassificationResult::unclassified().with_raw("cancelled");
        }

        let request = GenerationRequest {
            prompt: build_prompt(text),
            temperature: self.temperature,
        };
        let result = self.backend.select(&self.pivot_language, &request).await;

        if cancel.is_cancelled() {
            debug!(engine = %result.engine, "Discarding classification of cancelled request");
            return ClassificationResult::unclassified().with_raw("cancelled");
        }

        let Some(raw) = result.payload else {
            warn!(
                error = result.error.as_deref().unwrap_or("unknown"),
                "Generative backend unreachable, defaulting to OTHER"
            );
            return ClassificationResult::unclassified();
        };

        debug!(raw = %raw, "Raw classifier output");
        let parsed = parse_intent(&raw);
        if parsed.stage == ParseStage::Default {
            warn!("Could not map backend output to an intent");
        }

        let query_lower = text.to_lowercase();
        let intent = self
            .overrides
            .iter()
            .find_map(|o| o.apply(parsed.intent, &query_lower))
            .unwrap_or(parsed.intent);

        if intent != parsed.intent {
            info!(from = %parsed.intent, to = %intent, "Keyword override applied");
        }

        ClassificationResult::new(intent, parsed.stage.confidence()).with_raw(raw)
    }
}

pub(crate) fn build_prompt(query: &str) -> String {
    let today = chrono::Local::now().format("%Y-%m-%d");
    let mut catalogue = String::new();
    for intent in Intent::ALL {
        catalogue.push_str(&format!("- {}: {}\n", intent.as_str(), intent.description()));
    }

    format!(
        r#"You are an intent classifier for an energy grid system.
Today is {today}.

Allowed intents:
{catalogue}
Examples:
- "What is the load forecast for tomorrow?" -> LOAD_FORECASTING
- "Show me power demand for next week" -> LOAD_FORECASTING
- "Any theft detected?" -> THEFT_DETECTION
- "Show me transformer health" -> ASSET_MONITORING
- "Hello how are you?" -> OTHER

Respond ONLY in JSON format:
{{"intent": "<INTENT>"}}

Query: {query}
"#
    )
}
