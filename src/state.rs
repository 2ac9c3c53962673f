use crate::application::classifier::embedding::default_examples;
use crate::application::classifier::{
    EmbeddingClassifier, GenerativeClassifier, IntentClassifier, KeywordClassifier, Strategy,
};
use crate::application::dispatcher::{
    AccessPolicy, Dispatcher, GuidanceHandler, IntentHandler, ServiceHandler,
};
use crate::application::pipeline::{Pipeline, TranslationTier};
use crate::application::selector::EngineTier;
use crate::application::speech::{SynthesisService, TranscriptionService};
use crate::domain::error::CoreError;
use crate::domain::model::{
    AudioClip, Capability, GenerationRequest, Intent, SynthesisRequest, Transcript, TranscriptionRequest,
    TranslationRequest,
};
use crate::domain::traits::{
    GenerationEngine, SynthesisEngine, TranscriptionEngine, TranslationEngine,
};
use crate::infrastructure::audio::silent_wav;
use crate::infrastructure::config::{Config, EngineConfig, EngineKind, TierConfig};
use crate::infrastructure::local::{CommandSynthesisEngine, CommandTranscriptionEngine};
use crate::infrastructure::network::{
    create_client, GenerativeTranslationEngine, HttpDomainService, HttpSynthesisEngine,
    HttpTranscriptionEngine, HttpTranslationEngine, OllamaEmbedder, OllamaGenerator,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Length of the clip returned when every synthesis engine fails.
const SILENCE_MS: u32 = 1000;

/// Everything a request needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: Client,
    pub pipeline: Arc<Pipeline>,
    pub synthesis: Arc<SynthesisService>,
    pub transcription: Arc<TranscriptionService>,
}

impl AppState {
    pub async fn build(config: Config) -> Result<Self, CoreError> {
        config.validate()?;

        let http_client = create_client(config.request_timeout())?;
        let generator: Arc<GenerationEngine> = Arc::new(OllamaGenerator::new(
            http_client.clone(),
            &config.generative.endpoint,
            &config.generative.model,
        ));

        let translator = Arc::new(translation_tier(&config.translation, &http_client, &generator));
        let classifier = build_classifier(&config, &http_client, &generator).await?;
        let dispatcher = build_dispatcher(&config, &http_client)?;

        let pipeline = Pipeline::new(
            &config.pivot_language,
            Arc::clone(&translator),
            classifier,
            dispatcher,
        )
        .with_request_timeout(config.request_timeout())
        .with_ascii_heuristic(config.ascii_heuristic);

        let synthesis = SynthesisService::new(
            synthesis_tier(&config.synthesis, &http_client),
            silent_wav(SILENCE_MS)?,
        );
        let transcription = TranscriptionService::new(
            transcription_tier(&config.transcription, &http_client),
            Arc::clone(&translator),
            &config.pivot_language,
        );

        info!(
            strategy = pipeline.classifier().strategy().as_str(),
            translation = translator.len(),
            synthesis = synthesis.tier().len(),
            transcription = transcription.tier().len(),
            "Registry ready"
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            pipeline: Arc::new(pipeline),
            synthesis: Arc::new(synthesis),
            transcription: Arc::new(transcription),
        })
    }
}

fn url_of(engine: &EngineConfig) -> String {
    engine.url.clone().unwrap_or_default()
}

fn program_of(engine: &EngineConfig) -> String {
    engine.program.clone().unwrap_or_default()
}

fn translation_tier(
    tier: &TierConfig,
    client: &Client,
    generator: &Arc<GenerationEngine>,
) -> TranslationTier {
    let mut selector = EngineTier::<TranslationRequest, String>::new(Capability::Translation, tier.timeout());
    for engine in &tier.engines {
        let built: Arc<TranslationEngine> = match engine.kind {
            EngineKind::Http => Arc::new(HttpTranslationEngine::new(
                &engine.id,
                client.clone(),
                url_of(engine),
                engine.languages.clone(),
            )),
            EngineKind::Generative => Arc::new(GenerativeTranslationEngine::new(
                &engine.id,
                Arc::clone(generator),
                engine.languages.clone(),
            )),
            // Rejected by Config::validate.
            EngineKind::Command => continue,
        };
        selector.push(built, engine.timeout_or(tier.timeout()));
    }
    selector
}

fn synthesis_tier(tier: &TierConfig, client: &Client) -> EngineTier<SynthesisRequest, AudioClip> {
    let mut selector = EngineTier::new(Capability::Synthesis, tier.timeout());
    for engine in &tier.engines {
        let built: Arc<SynthesisEngine> = match engine.kind {
            EngineKind::Http => Arc::new(HttpSynthesisEngine::new(
                &engine.id,
                client.clone(),
                url_of(engine),
                engine.languages.clone(),
            )),
            EngineKind::Command => Arc::new(CommandSynthesisEngine::new(
                &engine.id,
                program_of(engine),
                engine.args.clone(),
                engine.languages.clone(),
            )),
            EngineKind::Generative => continue,
        };
        selector.push(built, engine.timeout_or(tier.timeout()));
    }
    selector
}

fn transcription_tier(
    tier: &TierConfig,
    client: &Client,
) -> EngineTier<TranscriptionRequest, Transcript> {
    let mut selector = EngineTier::new(Capability::Transcription, tier.timeout());
    for engine in &tier.engines {
        let built: Arc<TranscriptionEngine> = match engine.kind {
            EngineKind::Http => Arc::new(HttpTranscriptionEngine::new(
                &engine.id,
                client.clone(),
                url_of(engine),
                engine.languages.clone(),
            )),
            EngineKind::Command => Arc::new(CommandTranscriptionEngine::new(
                &engine.id,
                program_of(engine),
                engine.args.clone(),
                engine.languages.clone(),
            )),
            EngineKind::Generative => continue,
        };
        selector.push(built, engine.timeout_or(tier.timeout()));
    }
    selector
}

async fn build_classifier(
    config: &Config,
    client: &Client,
    generator: &Arc<GenerationEngine>,
) -> Result<IntentClassifier, CoreError> {
    let settings = &config.classifier;
    let classifier = match settings.strategy {
        Strategy::Keyword => IntentClassifier::Keyword(KeywordClassifier::new(&settings.keyword_table())?),
        Strategy::Embedding => {
            let embedder = Arc::new(OllamaEmbedder::new(
                client.clone(),
                &config.embedding.endpoint,
                &config.embedding.model,
                Duration::from_secs(config.embedding.timeout_secs),
            ));
            let examples = settings.example_table().unwrap_or_else(default_examples);
            IntentClassifier::Embedding(
                EmbeddingClassifier::build(embedder, &examples, settings.threshold).await?,
            )
        }
        Strategy::Generative => {
            let backend = EngineTier::<GenerationRequest, String>::new(
                Capability::Generation,
                Duration::from_secs(config.generative.timeout_secs),
            )
            .with_engine(Arc::clone(generator));
            IntentClassifier::Generative(GenerativeClassifier::new(
                backend,
                settings.overrides.clone(),
                config.generative.temperature,
                &config.pivot_language,
            ))
        }
    };
    Ok(classifier)
}

fn build_dispatcher(config: &Config, client: &Client) -> Result<Dispatcher, CoreError> {
    let mut handlers: Vec<Arc<dyn IntentHandler>> = Vec::new();
    for (intent, service) in Intent::DOMAIN
        .into_iter()
        .filter_map(|intent| config.service_for(intent).map(|service| (intent, service)))
    {
        let backend = Arc::new(HttpDomainService::new(
            intent.config_key(),
            client.clone(),
            &service.url,
            service.timeout(),
        ));
        let policy = AccessPolicy::new(service.allowed_roles.clone(), &config.admin_role);
        handlers.push(Arc::new(ServiceHandler::new(
            intent,
            backend,
            &service.answer_field,
            policy,
        )));
    }
    handlers.push(Arc::new(GuidanceHandler));

    Dispatcher::new(handlers)
}
