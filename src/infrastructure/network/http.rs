// HTTP client utilities
use crate::domain::error::CoreError;
use reqwest::Client;
use std::time::Duration;

/// Shared client for every remote engine and service. `timeout` bounds a
/// single call; tiers may apply tighter per-engine limits on top.
pub fn create_client(timeout: Duration) -> Result<Client, CoreError> {
    Ok(Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(timeout)
        .user_agent(concat!("grid-copilot/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Send errors and non-2xx statuses are transport failures.
pub fn transport(e: reqwest::Error) -> CoreError {
    CoreError::Transport(e.to_string())
}
