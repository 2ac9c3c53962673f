// Tiered capability selection: filter by eligibility, then try in order.
use crate::domain::model::{Capability, CapabilityResult};
use crate::domain::traits::CapabilityEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

struct TierEntry<I, O> {
    engine: Arc<dyn CapabilityEngine<I, O>>,
    timeout: Duration,
}

/// Ordered engines for one capability. Built at startup, read-only after.
///
/// Order is fixed by configuration; it never adapts to observed latency.
pub struct EngineTier<I, O> {
    capability: Capability,
    entries: Vec<TierEntry<I, O>>,
    default_timeout: Duration,
}

impl<I, O> EngineTier<I, O>
where
    I: Sync,
    O: Send,
{
    pub fn new(capability: Capability, default_timeout: Duration) -> Self {
        Self {
            capability,
            entries: Vec::new(),
            default_timeout,
        }
    }

    /// Append an engine using the tier's default per-call timeout.
    pub fn with_engine(mut self, engine: Arc<dyn CapabilityEngine<I, O>>) -> Self {
        let timeout = self.default_timeout;
        self.push(engine, timeout);
        self
    }

    pub fn push(&mut self, engine: Arc<dyn CapabilityEngine<I, O>>, timeout: Duration) {
        self.entries.push(TierEntry { engine, timeout });
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn engine_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.engine.id()).collect()
    }

    /// Engines whose `supports()` accepts the descriptor, in configured order.
    /// When none do, the whole tier is returned: attempting something beats
    /// failing silently.
    pub fn eligible(&self, descriptor: &str) -> Vec<&str> {
        self.eligible_entries(descriptor)
            .into_iter()
            .map(|e| e.engine.id())
            .collect()
    }

    fn eligible_entries(&self, descriptor: &str) -> Vec<&TierEntry<I, O>> {
        let matching: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.engine.supports(descriptor))
            .collect();

        if matching.is_empty() {
            debug!(
                capability = %self.capability,
                descriptor,
                "No engine claims descriptor, falling back to full tier"
            );
            self.entries.iter().collect()
        } else {
            matching
        }
    }

    /// Try eligible engines one by one and return the first success.
    ///
    /// Each engine gets exactly one attempt bounded by its own timeout.
    /// Failed attempts contribute nothing to the returned result.
    pub async fn select(&self, descriptor: &str, input: &I) -> CapabilityResult<O> {
        let candidates = self.eligible_entries(descriptor);
        if candidates.is_empty() {
            warn!(capability = %self.capability, "Tier has no engines configured");
            return CapabilityResult::failure("none", "no engines configured");
        }

        let mut last_engine = "none";
        for entry in candidates {
            let id = entry.engine.id();
            last_engine = id;
            debug!(capability = %self.capability, engine = id, "Attempting engine");

            match tokio::time::timeout(entry.timeout, entry.engine.invoke(input)).await {
                Ok(result) if result.is_success() => {
                    info!(capability = %self.capability, engine = id, "Engine succeeded");
                    return CapabilityResult {
                        engine: id.to_string(),
                        ..result
                    };
                }
                Ok(result) => {
                    warn!(
                        capability = %self.capability,
                        engine = id,
                        error = result.error.as_deref().unwrap_or("unknown"),
                        "Engine failed"
                    );
                }
                Err(_) => {
                    warn!(
                        capability = %self.capability,
                        engine = id,
                        timeout_ms = entry.timeout.as_millis() as u64,
                        "Engine timed out"
                    );
                }
            }
        }

        CapabilityResult::failure(
            last_engine,
            format!("all {} engines failed", self.capability),
        )
    }
}
