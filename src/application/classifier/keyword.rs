use crate::domain::error::CoreError;
use crate::domain::model::{ClassificationResult, Intent};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::debug;

/// Deterministic rule matcher. Intents are checked in declaration order
/// and the first one with a matching keyword wins.
pub struct KeywordClassifier {
    rules: Vec<(Intent, Vec<Regex>)>,
}

impl KeywordClassifier {
    /// Each keyword matches case-insensitively at a word start, so
    /// `forecast` also hits `forecasting`.
    pub fn new(table: &HashMap<Intent, Vec<String>>) -> Result<Self, CoreError> {
        let mut rules = Vec::new();
        for intent in Intent::DOMAIN {
            let Some(keywords) = table.get(&intent) else {
                continue;
            };
            let patterns = keywords
                .iter()
                .map(|k| compile_keyword(k))
                .collect::<Result<Vec<_>, _>>()?;
            if !patterns.is_empty() {
                rules.push((intent, patterns));
            }
        }
        Ok(Self { rules })
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        for (intent, patterns) in &self.rules {
            if let Some(hit) = patterns.iter().find_map(|p| p.find(text)) {
                debug!(intent = %intent, keyword = hit.as_str(), "Keyword match");
                return ClassificationResult::new(*intent, 1.0).with_raw(hit.as_str());
            }
        }
        ClassificationResult::unclassified()
    }

    /// First intent (by declared order) with a keyword in `text`, if any.
    pub fn first_match(&self, text: &str) -> Option<Intent> {
        let result = self.classify(text);
        (result.intent != Intent::Unclassified).then_some(result.intent)
    }
}

fn compile_keyword(keyword: &str) -> Result<Regex, CoreError> {
    // A bare `\b` would match every query.
    if keyword.trim().is_empty() {
        return Err(CoreError::Config("Keywords must not be blank".to_string()));
    }
    RegexBuilder::new(&format!(r"\b{}", regex::escape(keyword.trim())))
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::Config(format!("Invalid keyword '{}': {}", keyword, e)))
}

/// Built-in keyword tables for the grid domain.
pub fn default_keywords() -> HashMap<Intent, Vec<String>> {
    let table: [(Intent, &[&str]); 3] = [
        (
            Intent::LoadForecasting,
            &["load", "forecast", "demand", "peak hour", "capacity planning", "revenue"],
        ),
        (
            Intent::TheftDetection,
            &["theft", "steal", "tamper", "suspicious", "fraud", "bypass", "unauthorized", "anomal"],
        ),
        (
            Intent::AssetMonitoring,
            &["transformer", "asset", "equipment", "maintenance", "lifespan", "meter status"],
        ),
    ];

    table
        .into_iter()
        .map(|(intent, words)| (intent, words.iter().map(|w| w.to_string()).collect()))
        .collect()
}
