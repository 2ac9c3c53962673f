// Request pipeline: translate-in -> classify -> dispatch -> translate-out.
use crate::application::cancel::CancelToken;
use crate::application::classifier::IntentClassifier;
use crate::application::dispatcher::Dispatcher;
use crate::application::selector::EngineTier;
use crate::domain::model::{
    Degradation, HandlerErrorKind, Intent, PipelineResponse, Query, TranslationRequest,
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

const CANCELLED_MESSAGE: &str = "Request cancelled.";
const FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while processing your request. Please try again.";

/// How many leading characters the "already in pivot language" check reads.
const HEURISTIC_PREFIX: usize = 100;

pub type TranslationTier = EngineTier<TranslationRequest, String>;

pub struct Pipeline {
    pivot: String,
    ascii_heuristic: bool,
    translator: Arc<TranslationTier>,
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    request_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        pivot: impl Into<String>,
        translator: Arc<TranslationTier>,
        classifier: IntentClassifier,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            pivot: pivot.into(),
            ascii_heuristic: true,
            translator,
            classifier,
            dispatcher,
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Toggle the "pure ASCII means pivot language" shortcut.
    pub fn with_ascii_heuristic(mut self, enabled: bool) -> Self {
        self.ascii_heuristic = enabled;
        self
    }

    pub fn pivot(&self) -> &str {
        &self.pivot
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Always returns a response. Panics and the global request timeout
    /// both become a degraded answer rather than an error.
    pub async fn process(&self, query: &Query, cancel: &CancelToken) -> PipelineResponse {
        let span = info_span!("request", id = %Uuid::new_v4(), language = %query.language);
        let run = AssertUnwindSafe(self.run(query, cancel).instrument(span)).catch_unwind();

        match tokio::time::timeout(self.request_timeout, run).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                error!("Pipeline panicked, returning degraded response");
                self.fallback_response(query, Intent::Unclassified, FAILURE_MESSAGE, Degradation::Internal)
            }
            Err(_) => {
                error!(
                    timeout_secs = self.request_timeout.as_secs(),
                    "Pipeline timed out, returning degraded response"
                );
                self.fallback_response(query, Intent::Unclassified, FAILURE_MESSAGE, Degradation::TimedOut)
            }
        }
    }

    async fn run(&self, query: &Query, cancel: &CancelToken) -> PipelineResponse {
        let preview: String = query.text.chars().take(50).collect();
        info!(query = %preview, "Processing query");

        let mut degradations = Vec::new();

        // TranslateIn
        let working_text = if self.should_translate_in(query) {
            debug!(from = %query.language, to = %self.pivot, "Translating query to pivot");
            match self.translate(&query.text, &query.language, &self.pivot).await {
                Some(text) => {
                    debug!(working = %text, "Working context");
                    text
                }
                None => {
                    warn!("Query translation failed, classifying original text");
                    degradations.push(Degradation::TranslateInFailed);
                    query.text.clone()
                }
            }
        } else {
            query.text.clone()
        };

        if cancel.is_cancelled() {
            return self.fallback_response(query, Intent::Unclassified, CANCELLED_MESSAGE, Degradation::Cancelled);
        }

        // Classify
        let classification = self.classifier.classify(&working_text, cancel).await;
        let intent = classification.intent;

        if cancel.is_cancelled() {
            return self.fallback_response(query, intent, CANCELLED_MESSAGE, Degradation::Cancelled);
        }

        // Dispatch
        let outcome = self
            .dispatcher
            .route(intent, &working_text, query.role.as_deref(), cancel)
            .await;

        if outcome.error == Some(HandlerErrorKind::Cancelled) {
            return self.fallback_response(query, intent, CANCELLED_MESSAGE, Degradation::Cancelled);
        }

        let pivot_response = outcome.text;

        // TranslateOut
        let mut translated_response = None;
        if self.should_translate_out(query) {
            debug!(from = %self.pivot, to = %query.language, "Translating response back");
            match self.translate(&pivot_response, &self.pivot, &query.language).await {
                Some(text) => translated_response = Some(text),
                None => {
                    warn!("Response translation failed, replying in pivot language");
                    degradations.push(Degradation::TranslateOutFailed);
                }
            }
        }

        PipelineResponse {
            query: query.text.clone(),
            intent,
            response: translated_response
                .clone()
                .unwrap_or_else(|| pivot_response.clone()),
            language: query.language.clone(),
            translated_response,
            english_response: Some(pivot_response),
            degradations,
        }
    }

    fn is_pivot(&self, language: &str) -> bool {
        language.eq_ignore_ascii_case(&self.pivot)
    }

    /// Optimization only: a non-ASCII pivot text would still be translated.
    fn looks_like_pivot(&self, text: &str) -> bool {
        self.ascii_heuristic
            && text
                .replace('\n', " ")
                .trim()
                .chars()
                .take(HEURISTIC_PREFIX)
                .all(|c| c.is_ascii())
    }

    fn should_translate_in(&self, query: &Query) -> bool {
        if self.is_pivot(&query.language) {
            return false;
        }
        if self.looks_like_pivot(&query.text) {
            debug!("Query already looks like pivot language, skipping translation");
            return false;
        }
        true
    }

    fn should_translate_out(&self, query: &Query) -> bool {
        !self.is_pivot(&query.language) && !query.is_auto_language()
    }

    /// Tier-backed translation. `None` means every engine failed; the
    /// caller keeps the untranslated text.
    pub async fn translate(&self, text: &str, source: &str, target: &str) -> Option<String> {
        translate_with(&self.translator, &self.pivot, text, source, target).await
    }

    fn fallback_response(
        &self,
        query: &Query,
        intent: Intent,
        message: &str,
        reason: Degradation,
    ) -> PipelineResponse {
        PipelineResponse {
            query: query.text.clone(),
            intent,
            response: message.to_string(),
            language: query.language.clone(),
            translated_response: None,
            english_response: Some(message.to_string()),
            degradations: vec![reason],
        }
    }
}

/// Shared by the pipeline and the transcription service. The descriptor
/// used for engine eligibility is the non-pivot side of the pair.
pub async fn translate_with(
    tier: &TranslationTier,
    pivot: &str,
    text: &str,
    source: &str,
    target: &str,
) -> Option<String> {
    if text.trim().is_empty() || source.eq_ignore_ascii_case(target) {
        return Some(text.to_string());
    }

    let descriptor = if source.eq_ignore_ascii_case(pivot) {
        target
    } else {
        source
    };
    let request = TranslationRequest::new(text, source, target);
    let result = tier.select(descriptor, &request).await;

    match result.payload {
        Some(text) if !text.trim().is_empty() => {
            debug!(engine = %result.engine, "Translation complete");
            Some(text)
        }
        _ => None,
    }
}
