use super::http::transport;
use crate::domain::error::CoreError;
use crate::domain::traits::DomainService;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

/// Downstream analytic service reached with `POST {"prompt": ...}`.
pub struct HttpDomainService {
    name: String,
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpDomainService {
    pub fn new(name: impl Into<String>, client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DomainService for HttpDomainService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ask(&self, prompt: &str) -> Result<Value, CoreError> {
        self.client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&PromptBody { prompt })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .json::<Value>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))
    }
}
