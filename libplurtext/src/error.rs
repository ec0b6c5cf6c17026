//! Error types for Plurtext

use thiserror::Error;

use crate::types::{Dimensions, MediaType};

pub type Result<T> = std::result::Result<T, PlurtextError>;

#[derive(Error, Debug)]
pub enum PlurtextError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to resolve mention @{handle}: {cause}")]
    MentionResolutionFailed { handle: String, cause: ResolveError },

    #[error("Thread validation failed: {0}")]
    Thread(#[from] ThreadError),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlurtextError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PlurtextError::Validation(_) => 3,
            PlurtextError::Thread(_) => 3,
            PlurtextError::InvalidInput(_) => 3,
            PlurtextError::MentionResolutionFailed { .. } => 2,
            PlurtextError::Config(_) => 1,
            PlurtextError::UnknownPlatform(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Content and media validation failures
///
/// Every variant is recoverable by the caller: edit the text or pick
/// different media.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Text exceeds the {limit} character limit (current: {actual} characters)")]
    TextTooLong { limit: usize, actual: usize },

    #[error("{platform} does not accept media attachments")]
    MediaUnsupported { platform: String },

    #[error("Unsupported {media_type} format: {mime_type}")]
    UnsupportedFormat {
        media_type: MediaType,
        mime_type: String,
    },

    #[error("File size {actual} bytes exceeds the {limit} byte limit")]
    FileTooLarge { limit: u64, actual: u64 },

    #[error("Video duration {actual}s exceeds the {limit}s limit")]
    DurationExceeded { limit: f64, actual: f64 },

    #[error("Media dimensions {width}x{height} are outside the allowed range")]
    DimensionOutOfRange {
        width: u32,
        height: u32,
        min: Option<Dimensions>,
        max: Option<Dimensions>,
    },

    #[error("Alt text exceeds the {limit} character limit (current: {actual} characters)")]
    AltTextTooLong { limit: usize, actual: usize },

    #[error("Too many attachments: {actual} (maximum {limit})")]
    TooManyAttachments { limit: usize, actual: usize },
}

/// Failure reported by a [`crate::resolver::MentionResolver`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("handle not found")]
    NotFound,

    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// A single chunk of a planned thread that failed validation
#[derive(Error, Debug)]
#[error("chunk {index}: {cause}")]
pub struct ThreadChunkInvalid {
    /// Zero-based position of the chunk in the thread plan
    pub index: usize,
    pub cause: Box<PlurtextError>,
}

/// All invalid chunks of a planned thread, in thread order
#[derive(Debug)]
pub struct ThreadError {
    pub chunks: Vec<ThreadChunkInvalid>,
}

impl ThreadError {
    /// Indices of the failing chunks
    pub fn indices(&self) -> Vec<usize> {
        self.chunks.iter().map(|c| c.index).collect()
    }
}

impl std::fmt::Display for ThreadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} invalid chunk(s)", self.chunks.len())?;
        for chunk in &self.chunks {
            write!(f, "; {}", chunk)?;
        }
        Ok(())
    }
}

impl std::error::Error for ThreadError {}
