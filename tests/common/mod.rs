//! In-process fakes shared by the integration tests. Nothing here touches
//! the network.
#![allow(dead_code)]

use async_trait::async_trait;
use grid_copilot::application::classifier::keyword::default_keywords;
use grid_copilot::application::classifier::{IntentClassifier, KeywordClassifier};
use grid_copilot::application::dispatcher::{
    AccessPolicy, Dispatcher, GuidanceHandler, IntentHandler, ServiceHandler,
};
use grid_copilot::application::pipeline::{Pipeline, TranslationTier};
use grid_copilot::application::selector::EngineTier;
use grid_copilot::domain::error::CoreError;
use grid_copilot::domain::model::{Capability, CapabilityResult, Intent, TranslationRequest};
use grid_copilot::domain::traits::{CapabilityEngine, DomainService, Embedder};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN: &str = "ROLE_ADMINISTRATOR";

type Respond<I, O> = Box<dyn Fn(&I) -> Option<O> + Send + Sync>;

/// Engine whose answer is a closure; `None` means the attempt fails.
pub struct ScriptedEngine<I, O> {
    id: String,
    languages: Vec<String>,
    delay: Option<Duration>,
    respond: Respond<I, O>,
    calls: AtomicUsize,
}

impl<I: 'static, O: 'static> ScriptedEngine<I, O> {
    pub fn new(id: &str, respond: impl Fn(&I) -> Option<O> + Send + Sync + 'static) -> Self {
        Self {
            id: id.to_string(),
            languages: Vec::new(),
            delay: None,
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(id: &str) -> Self {
        Self::new(id, |_| None)
    }

    pub fn languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I, O> CapabilityEngine<I, O> for ScriptedEngine<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, descriptor: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == descriptor)
    }

    async fn invoke(&self, input: &I) -> CapabilityResult<O> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match (self.respond)(input) {
            Some(out) => CapabilityResult::success(&self.id, out),
            None => CapabilityResult::failure(&self.id, format!("{} failed", self.id)),
        }
    }
}

/// Translator backed by a phrase table. Unknown text is tagged with the
/// target language so tests can see it passed through an engine.
pub fn phrase_translator(id: &str, phrases: &[(&str, &str)]) -> ScriptedEngine<TranslationRequest, String> {
    let table: HashMap<String, String> = phrases
        .iter()
        .flat_map(|(a, b)| [(a.to_string(), b.to_string()), (b.to_string(), a.to_string())])
        .collect();
    ScriptedEngine::new(id, move |r: &TranslationRequest| {
        Some(
            table
                .get(&r.text)
                .cloned()
                .unwrap_or_else(|| format!("[{}] {}", r.target, r.text)),
        )
    })
}

pub fn translation_tier(engines: Vec<Arc<ScriptedEngine<TranslationRequest, String>>>) -> Arc<TranslationTier> {
    let mut tier = EngineTier::<TranslationRequest, String>::new(Capability::Translation, Duration::from_secs(2));
    for engine in engines {
        tier.push(engine, Duration::from_secs(2));
    }
    Arc::new(tier)
}

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Unreachable,
    Garbled,
}

/// Domain service that records every prompt it receives.
pub struct FakeService {
    name: String,
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new(name: &str, reply: Reply) -> Self {
        Self {
            name: name.to_string(),
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies `{"success": true, <field>: answer}`.
    pub fn answering(name: &str, field: &str, answer: &str) -> Self {
        Self::new(name, Reply::Json(json!({ "success": true, field: answer })))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainService for FakeService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ask(&self, prompt: &str) -> Result<Value, CoreError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Json(body) => Ok(body.clone()),
            Reply::Unreachable => Err(CoreError::Transport("connection refused".to_string())),
            Reply::Garbled => Err(CoreError::Parse("expected value at line 1".to_string())),
        }
    }
}

/// Embedder with a fixed vector per text. Unknown text embeds to `fallback`.
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    fail_queries: bool,
}

impl TableEmbedder {
    pub fn new(vectors: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            vectors: vectors
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            fallback,
            fail_queries: false,
        }
    }

    /// Example embedding works, but any text not in the table errors.
    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        texts
            .iter()
            .map(|t| match self.vectors.get(t) {
                Some(v) => Ok(v.clone()),
                None if self.fail_queries => Err(CoreError::Transport("embedder down".to_string())),
                None => Ok(self.fallback.clone()),
            })
            .collect()
    }
}

pub fn keyword_classifier() -> IntentClassifier {
    IntentClassifier::Keyword(KeywordClassifier::new(&default_keywords()).unwrap())
}

/// Every domain intent served by `service` under `answer_field`, with
/// `roles` as the allow-list.
pub fn dispatcher_for(service: Arc<FakeService>, answer_field: &str, roles: &[&str]) -> Dispatcher {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let mut handlers: Vec<Arc<dyn IntentHandler>> = Intent::DOMAIN
        .into_iter()
        .map(|intent| {
            Arc::new(ServiceHandler::new(
                intent,
                service.clone(),
                answer_field,
                AccessPolicy::new(roles.clone(), ADMIN),
            )) as Arc<dyn IntentHandler>
        })
        .collect();
    handlers.push(Arc::new(GuidanceHandler));
    Dispatcher::new(handlers).unwrap()
}

pub fn pipeline(translator: Arc<TranslationTier>, service: Arc<FakeService>) -> Pipeline {
    Pipeline::new(
        "en",
        translator,
        keyword_classifier(),
        dispatcher_for(service, "answer", &[]),
    )
}
