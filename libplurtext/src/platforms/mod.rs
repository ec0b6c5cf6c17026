//! Platform capability tables
//!
//! Each supported platform is described by a static, read-only
//! [`PlatformCapability`] row: its text limit in weighted units, how it counts
//! characters and links, and what media it accepts. The built-in rows are
//! constructed once and never mutated; configuration can layer overrides on
//! top through a [`CapabilityTable`].
//!
//! # Examples
//!
//! ```
//! use libplurtext::platforms::{self, CapabilityTable};
//!
//! let bluesky = platforms::capability("bluesky").unwrap();
//! assert_eq!(bluesky.max_text_length, 300);
//!
//! let table = CapabilityTable::builtin();
//! assert!(table.get("mastodon").is_some());
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{PlurtextError, Result};
use crate::types::{Dimensions, MediaType};

pub const TWITTER: &str = "twitter";
pub const BLUESKY: &str = "bluesky";
pub const MASTODON: &str = "mastodon";

/// Cost of a link once the platform has wrapped it in its shortener
pub const WRAPPED_URL_WEIGHT: usize = 23;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How a platform weighs individual code points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharWeighting {
    /// Every scalar value counts as one unit
    #[default]
    Uniform,
    /// Wide code points (CJK, most emoji) count as two units
    DisplayWidth,
}

/// Media limits for a platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub supported_image_formats: Vec<String>,
    pub supported_video_formats: Vec<String>,
    pub max_image_size_mb: f64,
    pub max_video_size_mb: f64,
    #[serde(default)]
    pub max_video_duration_seconds: Option<u32>,
    #[serde(default)]
    pub min_dimensions: Option<Dimensions>,
    #[serde(default)]
    pub max_dimensions: Option<Dimensions>,
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    #[serde(default)]
    pub max_alt_text_length: Option<usize>,
}

fn default_max_attachments() -> usize {
    4
}

fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB).floor() as u64
}

impl MediaConstraints {
    pub fn max_image_bytes(&self) -> u64 {
        mb_to_bytes(self.max_image_size_mb)
    }

    pub fn max_video_bytes(&self) -> u64 {
        mb_to_bytes(self.max_video_size_mb)
    }

    /// Allowed MIME types for a media type (GIFs share the image list)
    pub fn formats_for(&self, media_type: MediaType) -> &[String] {
        match media_type {
            MediaType::Image | MediaType::Gif => &self.supported_image_formats,
            MediaType::Video => &self.supported_video_formats,
        }
    }

    /// Byte limit for a media type (GIFs share the image limit)
    pub fn max_bytes_for(&self, media_type: MediaType) -> u64 {
        match media_type {
            MediaType::Image | MediaType::Gif => self.max_image_bytes(),
            MediaType::Video => self.max_video_bytes(),
        }
    }

    pub fn accepts_format(&self, media_type: MediaType, mime_type: &str) -> bool {
        self.formats_for(media_type)
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

/// Static description of what a platform accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformCapability {
    /// Lowercase identifier (e.g., "bluesky")
    pub name: String,
    /// Maximum effective length in weighted units
    pub max_text_length: usize,
    /// Fixed cost of each link; `None` counts links literally
    pub url_weight: Option<usize>,
    pub weighting: CharWeighting,
    /// Whether the composer leaves a reply's leading `@handle` run out of
    /// the count
    #[serde(default)]
    pub reply_mentions_free: bool,
    /// `None` when the platform accepts no media at all
    pub media: Option<MediaConstraints>,
}

impl PlatformCapability {
    /// A platform that only accepts text, counted uniformly
    pub fn text_only(name: impl Into<String>, max_text_length: usize) -> Self {
        Self {
            name: name.into(),
            max_text_length,
            url_weight: None,
            weighting: CharWeighting::Uniform,
            reply_mentions_free: false,
            media: None,
        }
    }

    pub fn supports_media(&self) -> bool {
        self.media.is_some()
    }
}

fn mime_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn twitter() -> PlatformCapability {
    PlatformCapability {
        name: TWITTER.to_string(),
        max_text_length: 280,
        url_weight: Some(WRAPPED_URL_WEIGHT),
        weighting: CharWeighting::DisplayWidth,
        reply_mentions_free: true,
        media: Some(MediaConstraints {
            supported_image_formats: mime_list(&["image/jpeg", "image/png", "image/webp", "image/gif"]),
            supported_video_formats: mime_list(&["video/mp4", "video/quicktime"]),
            max_image_size_mb: 5.0,
            max_video_size_mb: 512.0,
            max_video_duration_seconds: Some(140),
            min_dimensions: Some(Dimensions::new(4, 4)),
            max_dimensions: Some(Dimensions::new(8192, 8192)),
            max_attachments: 4,
            max_alt_text_length: Some(1000),
        }),
    }
}

fn bluesky() -> PlatformCapability {
    PlatformCapability {
        name: BLUESKY.to_string(),
        max_text_length: 300,
        url_weight: None,
        weighting: CharWeighting::Uniform,
        reply_mentions_free: false,
        media: Some(MediaConstraints {
            supported_image_formats: mime_list(&["image/jpeg", "image/png", "image/webp", "image/gif"]),
            supported_video_formats: mime_list(&["video/mp4", "video/mpeg", "video/webm", "video/quicktime"]),
            max_image_size_mb: 1.0,
            max_video_size_mb: 50.0,
            max_video_duration_seconds: Some(60),
            min_dimensions: None,
            max_dimensions: None,
            max_attachments: 4,
            max_alt_text_length: Some(2000),
        }),
    }
}

fn mastodon() -> PlatformCapability {
    PlatformCapability {
        name: MASTODON.to_string(),
        max_text_length: 500,
        url_weight: Some(WRAPPED_URL_WEIGHT),
        weighting: CharWeighting::Uniform,
        reply_mentions_free: false,
        media: Some(MediaConstraints {
            supported_image_formats: mime_list(&["image/jpeg", "image/png", "image/gif", "image/webp"]),
            supported_video_formats: mime_list(&["video/mp4", "video/webm", "video/quicktime"]),
            max_image_size_mb: 8.0,
            max_video_size_mb: 40.0,
            max_video_duration_seconds: None,
            min_dimensions: None,
            max_dimensions: None,
            max_attachments: 4,
            max_alt_text_length: Some(1500),
        }),
    }
}

static BUILTIN: Lazy<Vec<PlatformCapability>> = Lazy::new(|| vec![twitter(), bluesky(), mastodon()]);

/// All built-in capability rows
pub fn builtin() -> &'static [PlatformCapability] {
    BUILTIN.as_slice()
}

/// Look up a built-in capability row by name (case-insensitive)
pub fn capability(name: &str) -> Option<&'static PlatformCapability> {
    BUILTIN.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Built-in rows plus any configured overrides
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityTable {
    rows: Vec<PlatformCapability>,
}

impl CapabilityTable {
    pub fn builtin() -> Self {
        Self {
            rows: (*BUILTIN).clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PlatformCapability> {
        self.rows.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Like [`get`](Self::get), but unknown platforms are an error
    pub fn require(&self, name: &str) -> Result<&PlatformCapability> {
        self.get(name)
            .ok_or_else(|| PlurtextError::UnknownPlatform(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformCapability> {
        self.rows.iter()
    }

    /// Replace the row with the same name, or append a new one
    pub fn insert(&mut self, capability: PlatformCapability) {
        match self
            .rows
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(&capability.name))
        {
            Some(existing) => *existing = capability,
            None => self.rows.push(capability),
        }
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::builtin()
    }
}
