use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Audio encoding error: {0}")]
    Audio(#[from] hound::Error),
}

impl CoreError {
    /// Network-level failures: connection, timeout, non-2xx status.
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Transport(_) | CoreError::Http(_))
    }
}
