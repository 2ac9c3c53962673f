// Intent -> handler dispatch with per-intent role gating.
use crate::application::cancel::CancelToken;
use crate::domain::error::CoreError;
use crate::domain::model::{HandlerErrorKind, HandlerOutcome, Intent};
use crate::domain::traits::DomainService;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Static allow-list for one intent. The administrator sentinel passes
/// every list; an empty list admits any caller.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed_roles: Vec<String>,
    admin_role: String,
}

impl AccessPolicy {
    pub fn new(allowed_roles: Vec<String>, admin_role: impl Into<String>) -> Self {
        Self {
            allowed_roles,
            admin_role: admin_role.into(),
        }
    }

    pub fn permits(&self, role: Option<&str>) -> bool {
        if role == Some(self.admin_role.as_str()) {
            return true;
        }
        if self.allowed_roles.is_empty() {
            return true;
        }
        match role {
            Some(role) => self.allowed_roles.iter().any(|r| r == role),
            None => false,
        }
    }
}

#[async_trait]
pub trait IntentHandler: Send + Sync {
    fn intent(&self) -> Intent;

    /// Never retries and never fails: every problem becomes an outcome.
    async fn handle(&self, query: &str, role: Option<&str>, cancel: &CancelToken) -> HandlerOutcome;
}

/// Forwards the query to one downstream domain service.
pub struct ServiceHandler {
    intent: Intent,
    service: Arc<dyn DomainService>,
    answer_field: String,
    policy: AccessPolicy,
}

impl ServiceHandler {
    pub fn new(
        intent: Intent,
        service: Arc<dyn DomainService>,
        answer_field: impl Into<String>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            intent,
            service,
            answer_field: answer_field.into(),
            policy,
        }
    }

    fn interpret(&self, body: &Value) -> HandlerOutcome {
        let label = self.intent.label();
        let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);

        if success {
            let answer = body
                .get(&self.answer_field)
                .and_then(Value::as_str)
                .unwrap_or("No response received.");
            info!(intent = %self.intent, answer_len = answer.len(), "Service answered");
            return HandlerOutcome::ok(format!("{}{}", self.intent.response_prefix(), answer));
        }

        let message = body
            .get(&self.answer_field)
            .and_then(Value::as_str)
            .or_else(|| body.get("error").and_then(Value::as_str))
            .unwrap_or("Unknown error");
        warn!(intent = %self.intent, error = message, "Service reported failure");
        HandlerOutcome::failed(
            HandlerErrorKind::ServiceFailure,
            format!("{} Error: {}", label, message),
        )
    }
}

#[async_trait]
impl IntentHandler for ServiceHandler {
    fn intent(&self) -> Intent {
        self.intent
    }

    async fn handle(&self, query: &str, role: Option<&str>, cancel: &CancelToken) -> HandlerOutcome {
        let label = self.intent.label();

        if !self.policy.permits(role) {
            info!(intent = %self.intent, role = role.unwrap_or("<none>"), "Access denied");
            return HandlerOutcome::failed(
                HandlerErrorKind::AccessDenied,
                format!(
                    "Access Denied: You do not have permission to access {} services.",
                    label
                ),
            );
        }

        if cancel.is_cancelled() {
            return HandlerOutcome::cancelled();
        }

        debug!(intent = %self.intent, service = self.service.name(), "Calling domain service");
        let reply = self.service.ask(query).await;

        if cancel.is_cancelled() {
            debug!(intent = %self.intent, "Discarding service reply of cancelled request");
            return HandlerOutcome::cancelled();
        }

        match reply {
            Ok(body) => self.interpret(&body),
            Err(e) if e.is_transport() => {
                warn!(intent = %self.intent, error = %e, "Service unreachable");
                HandlerOutcome::failed(
                    HandlerErrorKind::Transport,
                    format!("{} service is unavailable. Please try again later.", label),
                )
            }
            Err(e) => {
                warn!(intent = %self.intent, error = %e, "Unreadable service reply");
                HandlerOutcome::failed(
                    HandlerErrorKind::ServiceFailure,
                    format!("{} Error: the service returned an unreadable response.", label),
                )
            }
        }
    }
}

/// Fallback for `Unclassified`: fixed guidance, no network.
pub struct GuidanceHandler;

impl GuidanceHandler {
    pub fn message() -> String {
        let mut text = format!(
            "{}I can help you with:\n",
            Intent::Unclassified.response_prefix()
        );
        for intent in Intent::DOMAIN {
            text.push_str(&format!("• {} - {}\n", intent.label(), intent.description()));
        }
        text.push_str("\nYour query didn't match these categories.");
        text
    }
}

#[async_trait]
impl IntentHandler for GuidanceHandler {
    fn intent(&self) -> Intent {
        Intent::Unclassified
    }

    async fn handle(&self, _query: &str, _role: Option<&str>, _cancel: &CancelToken) -> HandlerOutcome {
        debug!("Query did not match any domain, returning guidance");
        HandlerOutcome::ok(Self::message())
    }
}

/// Complete intent -> handler table, validated at construction.
pub struct Dispatcher {
    handlers: HashMap<Intent, Arc<dyn IntentHandler>>,
}

impl Dispatcher {
    /// Fails fast if any intent lacks a handler.
    pub fn new(handlers: Vec<Arc<dyn IntentHandler>>) -> Result<Self, CoreError> {
        let handlers: HashMap<_, _> = handlers.into_iter().map(|h| (h.intent(), h)).collect();
        let dispatcher = Self { handlers };
        dispatcher.validate()?;
        Ok(dispatcher)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = Intent::ALL
            .iter()
            .filter(|i| !self.handlers.contains_key(i))
            .map(|i| i.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Config(format!(
                "No handler registered for: {}",
                missing.join(", ")
            )))
        }
    }

    pub async fn route(
        &self,
        intent: Intent,
        query: &str,
        role: Option<&str>,
        cancel: &CancelToken,
    ) -> HandlerOutcome {
        info!(intent = %intent, role = role.unwrap_or("<none>"), "Routing query");

        let Some(handler) = self.handlers.get(&intent) else {
            error!(intent = %intent, "No handler configured");
            return HandlerOutcome::failed(
                HandlerErrorKind::Configuration,
                "Error: No handler configured for this intent",
            );
        };

        let outcome = handler.handle(query, role, cancel).await;
        debug!(
            intent = %intent,
            success = outcome.success,
            chars = outcome.text.len(),
            "Handler complete"
        );
        outcome
    }
}
