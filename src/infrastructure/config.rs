use crate::application::classifier::generative::default_overrides;
use crate::application::classifier::keyword::default_keywords;
use crate::application::classifier::{KeywordOverride, Strategy};
use crate::domain::error::CoreError;
use crate::domain::model::{Capability, Intent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_pivot_language")]
    pub pivot_language: String,
    /// Role value that passes every allow-list.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Skip input translation when the query is plain ASCII.
    #[serde(default = "default_true")]
    pub ascii_heuristic: bool,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub generative: GenerativeConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default = "default_translation_tier")]
    pub translation: TierConfig,
    #[serde(default = "default_synthesis_tier")]
    pub synthesis: TierConfig,
    #[serde(default = "default_transcription_tier")]
    pub transcription: TierConfig,
    /// Keyed by intent config key, e.g. `load_forecasting`.
    #[serde(default = "default_services")]
    pub services: HashMap<String, ServiceConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_true")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Keyword tables per intent config key. Empty means built-in tables.
    #[serde(default)]
    pub keywords: HashMap<String, Vec<String>>,
    /// Example utterances per intent config key. Empty means built-in set.
    #[serde(default)]
    pub examples: HashMap<String, Vec<String>>,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<KeywordOverride>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerativeConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generative_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_generative_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TierConfig {
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub engines: Vec<EngineConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Remote HTTP endpoint.
    Http,
    /// Local executable working through temp files.
    Command,
    /// Prompted translation through the generative backend.
    Generative,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    pub id: String,
    pub kind: EngineKind,
    pub url: Option<String>,
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Eligible languages. Empty accepts any language.
    #[serde(default)]
    pub languages: Vec<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    pub url: String,
    #[serde(default = "default_answer_field")]
    pub answer_field: String,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Logging {
    /// `EnvFilter` directive for the configured level. Unknown levels read as WARN.
    pub fn filter_directive(&self) -> &'static str {
        match self.level.to_uppercase().as_str() {
            "DEBUG" => "debug",
            "INFO" => "info",
            "WARN" => "warn",
            "ERROR" => "error",
            _ => "warn",
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            threshold: default_threshold(),
            keywords: HashMap::new(),
            examples: HashMap::new(),
            overrides: default_overrides(),
        }
    }
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_generative_model(),
            temperature: default_temperature(),
            timeout_secs: default_generative_timeout(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_embedding_model(),
            timeout_secs: default_engine_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pivot_language: default_pivot_language(),
            admin_role: default_admin_role(),
            request_timeout_secs: default_request_timeout(),
            ascii_heuristic: true,
            logging: Logging::default(),
            classifier: ClassifierConfig::default(),
            generative: GenerativeConfig::default(),
            embedding: EmbeddingConfig::default(),
            translation: default_translation_tier(),
            synthesis: default_synthesis_tier(),
            transcription: default_transcription_tier(),
            services: default_services(),
        }
    }
}

impl TierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EngineConfig {
    pub fn http(id: &str, url: &str, languages: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind: EngineKind::Http,
            url: Some(url.to_string()),
            program: None,
            args: Vec::new(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            timeout_secs: None,
        }
    }

    pub fn command(id: &str, program: &str, args: &[&str], languages: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind: EngineKind::Command,
            url: None,
            program: Some(program.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            timeout_secs: None,
        }
    }

    pub fn timeout_or(&self, tier_default: Duration) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(tier_default)
    }
}

impl ClassifierConfig {
    /// Configured keyword table keyed by intent, or the built-in one.
    pub fn keyword_table(&self) -> HashMap<Intent, Vec<String>> {
        if self.keywords.is_empty() {
            return default_keywords();
        }
        by_intent(&self.keywords)
    }

    pub fn example_table(&self) -> Option<HashMap<Intent, Vec<String>>> {
        (!self.examples.is_empty()).then(|| by_intent(&self.examples))
    }
}

fn by_intent(table: &HashMap<String, Vec<String>>) -> HashMap<Intent, Vec<String>> {
    Intent::DOMAIN
        .into_iter()
        .filter_map(|intent| {
            table
                .get(intent.config_key())
                .map(|values| (intent, values.clone()))
        })
        .collect()
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn service_for(&self, intent: Intent) -> Option<&ServiceConfig> {
        self.services.get(intent.config_key())
    }

    /// Startup validation. Anything caught here would otherwise surface
    /// as a configuration error at request time.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pivot_language.trim().is_empty() {
            return Err(CoreError::Config("pivot_language must not be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.classifier.threshold) {
            return Err(CoreError::Config(format!(
                "classifier.threshold must be within [0, 1], got {}",
                self.classifier.threshold
            )));
        }

        for (key, keywords) in &self.classifier.keywords {
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(CoreError::Config(format!(
                    "classifier.keywords.{} contains a blank keyword",
                    key
                )));
            }
        }

        for intent in Intent::DOMAIN {
            if self.service_for(intent).is_none() {
                return Err(CoreError::Config(format!(
                    "Missing [services.{}] for intent {}",
                    intent.config_key(),
                    intent
                )));
            }
        }

        for key in self.services.keys() {
            if !Intent::DOMAIN.iter().any(|i| i.config_key() == key) {
                return Err(CoreError::Config(format!("Unknown service intent '{}'", key)));
            }
        }

        validate_tier(Capability::Translation, &self.translation)?;
        validate_tier(Capability::Synthesis, &self.synthesis)?;
        validate_tier(Capability::Transcription, &self.transcription)?;

        self.validate_timeouts()
    }

    /// Every call made inside a request must time out before the request does,
    /// so a slow backend surfaces as its own failure.
    fn validate_timeouts(&self) -> Result<(), CoreError> {
        let mut calls: Vec<(String, u64)> = Vec::new();
        for intent in Intent::DOMAIN {
            if let Some(service) = self.service_for(intent) {
                calls.push((format!("services.{}", intent.config_key()), service.timeout_secs));
            }
        }
        calls.push(("translation".to_string(), self.translation.timeout_secs));
        for engine in &self.translation.engines {
            if let Some(secs) = engine.timeout_secs {
                calls.push((format!("translation engine '{}'", engine.id), secs));
            }
        }
        match self.classifier.strategy {
            Strategy::Generative => calls.push(("generative".to_string(), self.generative.timeout_secs)),
            Strategy::Embedding => calls.push(("embedding".to_string(), self.embedding.timeout_secs)),
            Strategy::Keyword => {}
        }

        for (name, secs) in calls {
            if secs >= self.request_timeout_secs {
                return Err(CoreError::Config(format!(
                    "{} timeout {}s must be below request_timeout_secs {}s",
                    name, secs, self.request_timeout_secs
                )));
            }
        }
        Ok(())
    }
}

fn validate_tier(capability: Capability, tier: &TierConfig) -> Result<(), CoreError> {
    for engine in &tier.engines {
        let problem = match engine.kind {
            EngineKind::Http if engine.url.is_none() => Some("requires `url`"),
            EngineKind::Command if engine.program.is_none() => Some("requires `program`"),
            EngineKind::Generative if capability != Capability::Translation => {
                Some("generative engines only support translation")
            }
            _ => None,
        };
        if let Some(problem) = problem {
            return Err(CoreError::Config(format!(
                "{} engine '{}' {}",
                capability, engine.id, problem
            )));
        }
    }
    Ok(())
}

// Defaults
fn default_true() -> bool {
    true
}
fn default_pivot_language() -> String {
    "en".to_string()
}
fn default_admin_role() -> String {
    "ROLE_ADMINISTRATOR".to_string()
}
fn default_request_timeout() -> u64 {
    300
}
fn default_log_level() -> String {
    "WARN".to_string()
}
fn default_strategy() -> Strategy {
    Strategy::Generative
}
fn default_threshold() -> f32 {
    0.35
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_generative_model() -> String {
    "gemma3:12b".to_string()
}
fn default_embedding_model() -> String {
    "all-minilm".to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_generative_timeout() -> u64 {
    45
}
fn default_engine_timeout() -> u64 {
    30
}
fn default_service_timeout() -> u64 {
    120
}
fn default_answer_field() -> String {
    "human_answer".to_string()
}

fn default_translation_tier() -> TierConfig {
    TierConfig {
        timeout_secs: default_engine_timeout(),
        engines: vec![EngineConfig::http(
            "speech-service",
            "http://localhost:8003/api/translation/translate",
            &[],
        )],
    }
}

fn default_synthesis_tier() -> TierConfig {
    TierConfig {
        timeout_secs: 60,
        engines: vec![
            EngineConfig::http(
                "indic-parler",
                "http://localhost:8003/api/tts",
                &["bn", "ta", "te", "gu", "kn", "ml", "mr"],
            ),
            EngineConfig::command(
                "piper",
                "piper",
                &["--model", "en_US-lessac-medium.onnx", "--output_file", "{output}"],
                &["en", "hi"],
            ),
        ],
    }
}

fn default_transcription_tier() -> TierConfig {
    TierConfig {
        timeout_secs: 120,
        engines: vec![EngineConfig::http(
            "whisper-service",
            "http://localhost:8003/api/transcribe",
            &[],
        )],
    }
}

fn default_services() -> HashMap<String, ServiceConfig> {
    let field_officer = "ROLE_FIELD_OFFICER".to_string();
    HashMap::from([
        (
            Intent::LoadForecasting.config_key().to_string(),
            ServiceConfig {
                url: "http://localhost:8001/api/chat".to_string(),
                answer_field: "answer".to_string(),
                allowed_roles: vec![field_officer.clone()],
                timeout_secs: default_service_timeout(),
            },
        ),
        (
            Intent::TheftDetection.config_key().to_string(),
            ServiceConfig {
                url: "http://localhost:8002/api/chat".to_string(),
                answer_field: default_answer_field(),
                allowed_roles: vec![field_officer.clone(), "ROLE_SUPERVISOR".to_string()],
                timeout_secs: default_service_timeout(),
            },
        ),
        (
            Intent::AssetMonitoring.config_key().to_string(),
            ServiceConfig {
                url: "http://localhost:8004/api/chat".to_string(),
                answer_field: default_answer_field(),
                allowed_roles: vec![field_officer],
                timeout_secs: default_service_timeout(),
            },
        ),
    ])
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("copilot").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<Config, CoreError> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn load_config() -> Result<Config, CoreError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            match parse_config(&content) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config file: {}. Using defaults.",
                        e
                    );
                }
            }
        }
    }

    Ok(Config::default())
}

pub fn generate_config_sample() -> Result<(), CoreError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            eprintln!("Config file already exists at: {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let sample = Config::default();
        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, toml_content)
            .map_err(|e| CoreError::Config(format!("Failed to write config file: {}", e)))?;
        println!("Generated config file at: {}", path.display());
    } else {
        return Err(CoreError::Config(
            "Cannot determine config directory".to_string(),
        ));
    }

    Ok(())
}
