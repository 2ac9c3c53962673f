use crate::domain::error::CoreError;
use crate::domain::model::{ClassificationResult, Intent};
use crate::domain::traits::Embedder;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct ExampleVector {
    intent: Intent,
    utterance: String,
    vector: Vec<f32>,
}

/// Nearest-example classifier over precomputed utterance embeddings.
///
/// The best example's score is the confidence. Scores below `threshold`
/// yield `Unclassified`; the gate is inclusive at the threshold itself.
pub struct EmbeddingClassifier {
    embedder: Arc<dyn Embedder>,
    examples: Vec<ExampleVector>,
    threshold: f32,
}

impl EmbeddingClassifier {
    /// Embeds every curated example once. Must finish before the first
    /// request; failure here is a startup error.
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        examples: &HashMap<Intent, Vec<String>>,
        threshold: f32,
    ) -> Result<Self, CoreError> {
        let mut vectors = Vec::new();

        for intent in Intent::DOMAIN {
            let Some(utterances) = examples.get(&intent).filter(|u| !u.is_empty()) else {
                continue;
            };
            let embedded = embedder.embed(utterances).await?;
            if embedded.len() != utterances.len() {
                return Err(CoreError::Config(format!(
                    "Embedder returned {} vectors for {} {} examples",
                    embedded.len(),
                    utterances.len(),
                    intent
                )));
            }
            for (utterance, vector) in utterances.iter().zip(embedded) {
                vectors.push(ExampleVector {
                    intent,
                    utterance: utterance.clone(),
                    vector,
                });
            }
        }

        if vectors.is_empty() {
            return Err(CoreError::Config(
                "Embedding classifier has no example utterances".to_string(),
            ));
        }

        info!(examples = vectors.len(), threshold, "Precomputed intent embeddings");

        Ok(Self {
            embedder,
            examples: vectors,
            threshold,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub async fn classify(&self, text: &str) -> ClassificationResult {
        let query = match self.embedder.embed(&[text.to_string()]).await {
            Ok(mut vectors) if !vectors.is_empty() => vectors.swap_remove(0),
            Ok(_) => {
                warn!("Embedder returned no vector for query");
                return ClassificationResult::unclassified();
            }
            Err(e) => {
                warn!(error = %e, "Query embedding failed");
                return ClassificationResult::unclassified();
            }
        };

        let best = self
            .examples
            .iter()
            .map(|ex| (ex, cosine_similarity(&query, &ex.vector)))
            .filter(|(_, score)| score.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let Some((example, confidence)) = best else {
            return ClassificationResult::unclassified();
        };

        debug!(
            intent = %example.intent,
            confidence,
            example = %example.utterance,
            "Best embedding match"
        );

        if confidence < self.threshold {
            debug!(confidence, threshold = self.threshold, "Below threshold");
            return ClassificationResult::new(Intent::Unclassified, confidence)
                .with_raw(example.utterance.clone());
        }

        ClassificationResult::new(example.intent, confidence).with_raw(example.utterance.clone())
    }
}

/// Cosine similarity; zero-length or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Curated example utterances per intent.
pub fn default_examples() -> HashMap<Intent, Vec<String>> {
    let table: [(Intent, &[&str]); 3] = [
        (
            Intent::LoadForecasting,
            &[
                "Forecast electricity demand for next month",
                "Predict power consumption trends",
                "Load forecasting for summer season",
                "Expected demand during peak hours",
                "Energy demand prediction model",
                "What is the load forecast for tomorrow?",
                "Show me power demand for next week",
                "Predict revenue for next quarter",
                "Capacity planning for grid infrastructure",
            ],
        ),
        (
            Intent::TheftDetection,
            &[
                "Detect electricity theft in my region",
                "Identify abnormal consumption patterns",
                "Find customers with suspicious usage",
                "Meter tampering detection",
                "Customers bypassing meters",
                "Detect unauthorized connections",
                "Any theft detected?",
                "Show me theft alerts",
                "Customers using wrong tariff category",
            ],
        ),
        (
            Intent::AssetMonitoring,
            &[
                "Check transformer remaining lifespan",
                "Transformer health assessment",
                "Predict transformer failure",
                "Remaining useful life of transformers",
                "When should we replace this transformer?",
                "What is the status of the meters?",
                "Asset health status overall",
                "Equipment failure prediction",
                "Schedule preventive maintenance",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(intent, lines)| (intent, lines.iter().map(|l| l.to_string()).collect()))
        .collect()
}
