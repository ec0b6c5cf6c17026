//! Core types for Plurtext

use serde::{Deserialize, Serialize};

// ============================================================================
// Facet Types
// ============================================================================

/// Half-open byte range `[byte_start, byte_end)` into UTF-8 text
///
/// Offsets always count UTF-8 bytes of the original text, never characters
/// or weighted units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub byte_start: u32,
    pub byte_end: u32,
}

impl Span {
    pub fn new(byte_start: u32, byte_end: u32) -> Self {
        Self {
            byte_start,
            byte_end,
        }
    }

    /// Length in bytes
    pub fn len(&self) -> u32 {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_start >= self.byte_end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.byte_start < other.byte_end && other.byte_start < self.byte_end
    }

    /// Slice `text` by this span
    ///
    /// Returns `None` if the span is out of bounds or not on char boundaries.
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.byte_start as usize..self.byte_end as usize)
    }
}

/// The kind of a facet, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Mention,
    Link,
    Tag,
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mention => write!(f, "mention"),
            Self::Link => write!(f, "link"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Outcome of resolving a mention handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MentionTarget {
    /// Handle resolved to a stable account identifier (e.g. a DID)
    Resolved { handle: String, did: String },
    /// Resolution failed; kept only under [`crate::text::MentionPolicy::Keep`]
    Unresolved { handle: String, reason: String },
}

impl MentionTarget {
    pub fn handle(&self) -> &str {
        match self {
            Self::Resolved { handle, .. } | Self::Unresolved { handle, .. } => handle,
        }
    }

    pub fn did(&self) -> Option<&str> {
        match self {
            Self::Resolved { did, .. } => Some(did),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Kind-specific payload of a facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetFeature {
    Mention(MentionTarget),
    Link { uri: String },
    /// Tag text without the leading `#`
    Tag { tag: String },
}

/// A typed annotation over a span of text
///
/// Facets are produced by [`crate::text::extract_facets`] and are immutable
/// once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    span: Span,
    feature: FacetFeature,
}

impl Facet {
    pub(crate) fn new(span: Span, feature: FacetFeature) -> Self {
        Self { span, feature }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn feature(&self) -> &FacetFeature {
        &self.feature
    }

    pub fn kind(&self) -> FacetKind {
        match self.feature {
            FacetFeature::Mention(_) => FacetKind::Mention,
            FacetFeature::Link { .. } => FacetKind::Link,
            FacetFeature::Tag { .. } => FacetKind::Tag,
        }
    }

    /// Convert to the AT Protocol wire shape
    ///
    /// Unresolved mentions have no identifier to send and yield `None`.
    pub fn to_wire(&self) -> Option<WireFacet> {
        let feature = match &self.feature {
            FacetFeature::Mention(MentionTarget::Resolved { did, .. }) => {
                WireFeature::Mention { did: did.clone() }
            }
            FacetFeature::Mention(MentionTarget::Unresolved { .. }) => return None,
            FacetFeature::Link { uri } => WireFeature::Link { uri: uri.clone() },
            FacetFeature::Tag { tag } => WireFeature::Tag { tag: tag.clone() },
        };

        Some(WireFacet {
            index: self.span,
            features: vec![feature],
        })
    }
}

/// Facet as serialized for `app.bsky.richtext.facet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFacet {
    pub index: Span,
    pub features: Vec<WireFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum WireFeature {
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

/// Convert a facet list to its wire form, dropping unresolved mentions
pub fn to_wire(facets: &[Facet]) -> Vec<WireFacet> {
    facets.iter().filter_map(Facet::to_wire).collect()
}

// ============================================================================
// Media Types
// ============================================================================

/// Kind of a candidate attachment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Gif,
}

impl MediaType {
    /// Classify a MIME string (e.g., "image/jpeg")
    pub fn from_mime_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower == "image/gif" {
            Some(Self::Gif)
        } else if lower.starts_with("image/") {
            Some(Self::Image)
        } else if lower.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Detect media type and MIME string from a file extension
    pub fn from_extension(ext: &str) -> Option<(Self, &'static str)> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some((Self::Image, "image/jpeg")),
            "png" => Some((Self::Image, "image/png")),
            "webp" => Some((Self::Image, "image/webp")),
            "gif" => Some((Self::Gif, "image/gif")),
            "mp4" => Some((Self::Video, "video/mp4")),
            "mov" => Some((Self::Video, "video/quicktime")),
            "webm" => Some((Self::Video, "video/webm")),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Gif => "gif",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A candidate attachment, described before upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDescriptor {
    pub media_type: MediaType,
    pub mime_type: String,
    pub file_size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
    pub alt_text: Option<String>,
}

impl MediaDescriptor {
    pub fn new(media_type: MediaType, mime_type: impl Into<String>, file_size_bytes: u64) -> Self {
        Self {
            media_type,
            mime_type: mime_type.into(),
            file_size_bytes,
            width: None,
            height: None,
            duration_seconds: None,
            alt_text: None,
        }
    }

    pub fn image(mime_type: impl Into<String>, file_size_bytes: u64) -> Self {
        Self::new(MediaType::Image, mime_type, file_size_bytes)
    }

    pub fn gif(file_size_bytes: u64) -> Self {
        Self::new(MediaType::Gif, "image/gif", file_size_bytes)
    }

    pub fn video(mime_type: impl Into<String>, file_size_bytes: u64, duration_seconds: f64) -> Self {
        let mut media = Self::new(MediaType::Video, mime_type, file_size_bytes);
        media.duration_seconds = Some(duration_seconds);
        media
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }
}

// ============================================================================
// Thread Types
// ============================================================================

/// One post of a planned thread
///
/// Posts are meant to be published in order, each replying to the previous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadPost {
    /// Zero-based position in the thread
    pub index: usize,
    pub text: String,
    pub media: Vec<MediaDescriptor>,
    /// Facets with offsets local to `text`
    pub facets: Vec<Facet>,
}

impl ThreadPost {
    /// Facets of this post in wire form
    pub fn wire_facets(&self) -> Vec<WireFacet> {
        to_wire(&self.facets)
    }
}
