//! Mention resolution
//!
//! A [`MentionResolver`] turns a handle (without its leading `@`) into a
//! stable account identifier such as a DID. The facet assembler calls it once
//! per mention, concurrently, so implementations must be `Send + Sync`.
//!
//! # Examples
//!
//! ```
//! use libplurtext::resolver::{MentionResolver, StaticResolver};
//!
//! # async fn example() {
//! let resolver = StaticResolver::new().with("alice.com", "did:plc:alice");
//! assert_eq!(resolver.resolve("Alice.com").await.unwrap(), "did:plc:alice");
//! assert!(resolver.resolve("bob.com").await.is_err());
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ResolveError;

// Mock resolver is available for all builds to support integration tests
pub mod mock;

/// Handle to identifier lookup
#[async_trait]
pub trait MentionResolver: Send + Sync {
    /// Resolve `handle` (no leading `@`) to an account identifier
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] for unknown handles and
    /// [`ResolveError::Unavailable`] when the lookup itself could not be made.
    async fn resolve(&self, handle: &str) -> std::result::Result<String, ResolveError>;
}

#[async_trait]
impl<T: MentionResolver + ?Sized> MentionResolver for Arc<T> {
    async fn resolve(&self, handle: &str) -> std::result::Result<String, ResolveError> {
        (**self).resolve(handle).await
    }
}

#[async_trait]
impl<T: MentionResolver + ?Sized> MentionResolver for &T {
    async fn resolve(&self, handle: &str) -> std::result::Result<String, ResolveError> {
        (**self).resolve(handle).await
    }
}

/// In-memory resolver backed by a handle map
///
/// Handles are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, handle: impl AsRef<str>, did: impl Into<String>) -> Self {
        self.insert(handle, did);
        self
    }

    pub fn insert(&mut self, handle: impl AsRef<str>, did: impl Into<String>) {
        self.entries
            .insert(normalize(handle.as_ref()), did.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(handle: &str) -> String {
    handle.trim_start_matches('@').to_lowercase()
}

impl<H, D> FromIterator<(H, D)> for StaticResolver
where
    H: AsRef<str>,
    D: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (H, D)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (handle, did) in iter {
            resolver.insert(handle, did);
        }
        resolver
    }
}

#[async_trait]
impl MentionResolver for StaticResolver {
    async fn resolve(&self, handle: &str) -> std::result::Result<String, ResolveError> {
        self.entries
            .get(&normalize(handle))
            .cloned()
            .ok_or(ResolveError::NotFound)
    }
}
