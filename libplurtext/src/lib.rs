//! Plurtext - rich-text analysis for decentralized social posts
//!
//! This library finds links, mentions and hashtags in post text and turns
//! them into facets with UTF-8 byte offsets, counts text the way each
//! platform does, validates text and media against per-platform limits, and
//! plans threads. It performs no network I/O of its own: mention lookup goes
//! through a caller-supplied [`MentionResolver`].

pub mod config;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod resolver;
pub mod text;
pub mod thread;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PlurtextError, Result};
pub use platforms::{CapabilityTable, PlatformCapability};
pub use resolver::{MentionResolver, StaticResolver};
pub use text::{effective_length, extract_facets, MentionPolicy};
pub use thread::{split_thread, ThreadRequest};
pub use types::{Facet, MediaDescriptor, MediaType, Span, ThreadPost, WireFacet};
pub use validation::{validate_attachments, validate_content, validate_media};
