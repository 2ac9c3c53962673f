//! Defensive parsing of generative-backend output into an [`Intent`].
//!
//! Backends are asked for `{"intent": "<NAME>"}` but regularly wrap it in
//! code fences, add prose, or answer with a near-miss name. The parser
//! tries progressively looser stages and stops at the first hit:
//!
//! 1. strict: the first `{...}` block deserializes and names a known intent
//! 2. field: a regex pulls the `"intent": "..."` value out of broken JSON
//! 3. heuristic: keyword substrings in the extracted value or whole reply
//!
//! Anything else maps to [`Intent::Unclassified`].

use crate::domain::model::Intent;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

static INTENT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"?intent"?\s*:\s*"?([A-Za-z_ \-]+)"?"#).expect("static regex"));

#[derive(Deserialize)]
struct IntentPayload {
    intent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Strict,
    Field,
    Heuristic,
    Default,
}

impl ParseStage {
    /// Confidence reported for an intent recovered at this stage.
    pub fn confidence(&self) -> f32 {
        match self {
            ParseStage::Strict => 1.0,
            ParseStage::Field => 0.8,
            ParseStage::Heuristic => 0.5,
            ParseStage::Default => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedIntent {
    pub intent: Intent,
    pub stage: ParseStage,
}

pub fn parse_intent(raw: &str) -> ParsedIntent {
    let cleaned = strip_code_fences(raw);

    if let Some(intent) = strict_stage(&cleaned) {
        return ParsedIntent {
            intent,
            stage: ParseStage::Strict,
        };
    }

    let field = INTENT_FIELD
        .captures(&cleaned)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    if let Some(intent) = field.as_deref().and_then(Intent::from_name) {
        return ParsedIntent {
            intent,
            stage: ParseStage::Field,
        };
    }

    let haystack = field.unwrap_or(cleaned);
    if let Some(intent) = keyword_stage(&haystack) {
        return ParsedIntent {
            intent,
            stage: ParseStage::Heuristic,
        };
    }

    ParsedIntent {
        intent: Intent::Unclassified,
        stage: ParseStage::Default,
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn strict_stage(text: &str) -> Option<Intent> {
    let block = JSON_BLOCK.find(text)?;
    let payload: IntentPayload = serde_json::from_str(block.as_str()).ok()?;
    Intent::from_name(&payload.intent)
}

fn keyword_stage(text: &str) -> Option<Intent> {
    let normalized = text.to_uppercase();
    if normalized.contains("THEFT") {
        Some(Intent::TheftDetection)
    } else if normalized.contains("LOAD") || normalized.contains("FORECAST") {
        Some(Intent::LoadForecasting)
    } else if normalized.contains("ASSET") || normalized.contains("TRANSFORMER") {
        Some(Intent::AssetMonitoring)
    } else {
        None
    }
}
