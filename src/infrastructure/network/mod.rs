pub mod http;
pub mod ollama;
pub mod service;
pub mod speech;
pub mod translation;

pub use http::create_client;
pub use ollama::{OllamaEmbedder, OllamaGenerator};
pub use service::HttpDomainService;
pub use speech::{HttpSynthesisEngine, HttpTranscriptionEngine};
pub use translation::{GenerativeTranslationEngine, HttpTranslationEngine};
