//! Mock resolver implementation for testing
//!
//! This module provides a configurable mock resolver that can simulate
//! per-handle successes, failures and delays. It's designed for use in
//! integration tests to verify facet assembly without a network-backed
//! resolver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::MentionResolver;
use crate::error::ResolveError;

/// Configuration for mock resolver behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Known handles (lowercase) and the identifier each resolves to
    pub identities: HashMap<String, String>,

    /// Handles that fail with a specific error, checked before `identities`
    pub failures: HashMap<String, ResolveError>,

    /// Delay applied to every lookup (simulates network latency)
    pub delay: Duration,

    /// Per-handle delay, overriding `delay`
    pub handle_delays: HashMap<String, Duration>,

    /// Handles in the order lookups were made
    pub calls: Arc<Mutex<Vec<String>>>,
}

/// Mock resolver for testing
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    config: MockConfig,
}

impl MockResolver {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock resolver that knows the given handles
    pub fn with_identities<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut resolver = Self::default();
        for (handle, did) in pairs {
            resolver = resolver.identity(handle, did);
        }
        resolver
    }

    /// Create a mock resolver whose backend is down for every handle
    pub fn unavailable(reason: &str) -> Self {
        Self::new(MockConfig::default()).fallback_failure(reason)
    }

    pub fn identity(mut self, handle: &str, did: &str) -> Self {
        self.config
            .identities
            .insert(handle.to_lowercase(), did.to_string());
        self
    }

    pub fn failure(mut self, handle: &str, error: ResolveError) -> Self {
        self.config.failures.insert(handle.to_lowercase(), error);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn handle_delay(mut self, handle: &str, delay: Duration) -> Self {
        self.config
            .handle_delays
            .insert(handle.to_lowercase(), delay);
        self
    }

    fn fallback_failure(mut self, reason: &str) -> Self {
        self.config
            .failures
            .insert(String::new(), ResolveError::Unavailable(reason.to_string()));
        self
    }

    /// Get the number of times resolve was called
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Get the handles that were looked up, in call order
    pub fn calls(&self) -> Vec<String> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // A panicking test thread can poison the log; the data is still usable
        self.config
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MentionResolver for MockResolver {
    async fn resolve(&self, handle: &str) -> std::result::Result<String, ResolveError> {
        let key = handle.to_lowercase();
        self.lock_calls().push(handle.to_string());

        let delay = self
            .config
            .handle_delays
            .get(&key)
            .copied()
            .unwrap_or(self.config.delay);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        if let Some(error) = self.config.failures.get(&key) {
            return Err(error.clone());
        }

        match self.config.identities.get(&key) {
            Some(did) => Ok(did.clone()),
            None => match self.config.failures.get("") {
                Some(error) => Err(error.clone()),
                None => Err(ResolveError::NotFound),
            },
        }
    }
}
