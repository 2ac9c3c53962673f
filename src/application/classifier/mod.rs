// Intent classification behind one interface with pluggable strategies.

pub mod embedding;
pub mod generative;
pub mod keyword;
pub mod parser;

pub use embedding::EmbeddingClassifier;
pub use generative::{GenerativeClassifier, KeywordOverride};
pub use keyword::KeywordClassifier;

use crate::application::cancel::CancelToken;
use crate::domain::model::ClassificationResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which strategy the startup registry builds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Keyword,
    Embedding,
    Generative,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Keyword => "keyword",
            Strategy::Embedding => "embedding",
            Strategy::Generative => "generative",
        }
    }
}

/// Maps free text to an intent. Never fails: `Unclassified` is the answer
/// for low confidence, unreachable backends and unparseable output.
pub enum IntentClassifier {
    Keyword(KeywordClassifier),
    Embedding(EmbeddingClassifier),
    Generative(GenerativeClassifier),
}

impl IntentClassifier {
    pub fn strategy(&self) -> Strategy {
        match self {
            IntentClassifier::Keyword(_) => Strategy::Keyword,
            IntentClassifier::Embedding(_) => Strategy::Embedding,
            IntentClassifier::Generative(_) => Strategy::Generative,
        }
    }

    pub async fn classify(&self, text: &str, cancel: &CancelToken) -> ClassificationResult {
        let result = match self {
            IntentClassifier::Keyword(k) => k.classify(text),
            IntentClassifier::Embedding(e) => e.classify(text).await,
            IntentClassifier::Generative(g) => g.classify(text, cancel).await,
        };

        info!(
            strategy = self.strategy().as_str(),
            intent = %result.intent,
            confidence = result.confidence,
            "Classified query"
        );
        result
    }
}
