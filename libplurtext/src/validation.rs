//! Content and media validation
//!
//! The free functions check one text or one attachment against one
//! [`PlatformCapability`] and report the first violation found. The
//! [`ValidationService`] runs the text checks against several named
//! platforms at once and reports every result, for front ends that show a
//! per-platform summary.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{PlurtextError, Result, ValidationError};
use crate::platforms::{CapabilityTable, MediaConstraints, PlatformCapability};
use crate::text::counter;
use crate::types::{MediaDescriptor, MediaType};

/// Check `text` against the platform's text limit
///
/// Empty text is valid here; whether an empty post makes sense is up to the
/// caller.
///
/// # Errors
///
/// Returns [`ValidationError::TextTooLong`] when the effective length exceeds
/// `max_text_length`.
pub fn validate_content(text: &str, platform: &PlatformCapability, is_reply: bool) -> Result<()> {
    let actual = counter::effective_length(text, platform, is_reply);
    if actual > platform.max_text_length {
        return Err(ValidationError::TextTooLong {
            limit: platform.max_text_length,
            actual,
        }
        .into());
    }
    Ok(())
}

/// Check one attachment against the platform's media limits
///
/// Checks run in a fixed order and the first failure is returned: media
/// support, format, file size, video duration, image dimensions, alt text.
pub fn validate_media(media: &MediaDescriptor, platform: &PlatformCapability) -> Result<()> {
    let constraints = media_constraints(platform)?;

    if !constraints.accepts_format(media.media_type, &media.mime_type) {
        return Err(ValidationError::UnsupportedFormat {
            media_type: media.media_type,
            mime_type: media.mime_type.clone(),
        }
        .into());
    }

    let max_bytes = constraints.max_bytes_for(media.media_type);
    if media.file_size_bytes > max_bytes {
        return Err(ValidationError::FileTooLarge {
            limit: max_bytes,
            actual: media.file_size_bytes,
        }
        .into());
    }

    match media.media_type {
        MediaType::Video => check_duration(media, constraints)?,
        MediaType::Image | MediaType::Gif => check_dimensions(media, constraints)?,
    }

    if let (Some(limit), Some(alt_text)) = (constraints.max_alt_text_length, &media.alt_text) {
        let actual = alt_text.chars().count();
        if actual > limit {
            return Err(ValidationError::AltTextTooLong { limit, actual }.into());
        }
    }

    Ok(())
}

/// Check the attachment count, then each attachment in order
pub fn validate_attachments(media: &[MediaDescriptor], platform: &PlatformCapability) -> Result<()> {
    if media.is_empty() {
        return Ok(());
    }

    let constraints = media_constraints(platform)?;
    if media.len() > constraints.max_attachments {
        return Err(ValidationError::TooManyAttachments {
            limit: constraints.max_attachments,
            actual: media.len(),
        }
        .into());
    }

    media
        .iter()
        .try_for_each(|item| validate_media(item, platform))
}

fn media_constraints(platform: &PlatformCapability) -> Result<&MediaConstraints> {
    platform.media.as_ref().ok_or_else(|| {
        ValidationError::MediaUnsupported {
            platform: platform.name.clone(),
        }
        .into()
    })
}

fn check_duration(media: &MediaDescriptor, constraints: &MediaConstraints) -> Result<()> {
    let (Some(limit), Some(actual)) = (constraints.max_video_duration_seconds, media.duration_seconds)
    else {
        return Ok(());
    };

    let limit = f64::from(limit);
    if actual > limit {
        return Err(ValidationError::DurationExceeded { limit, actual }.into());
    }
    Ok(())
}

fn check_dimensions(media: &MediaDescriptor, constraints: &MediaConstraints) -> Result<()> {
    let (Some(width), Some(height)) = (media.width, media.height) else {
        return Ok(());
    };

    let too_small = constraints
        .min_dimensions
        .is_some_and(|min| width < min.width || height < min.height);
    let too_large = constraints
        .max_dimensions
        .is_some_and(|max| width > max.width || height > max.height);

    if too_small || too_large {
        return Err(ValidationError::DimensionOutOfRange {
            width,
            height,
            min: constraints.min_dimensions,
            max: constraints.max_dimensions,
        }
        .into());
    }
    Ok(())
}

// ============================================================================
// Multi-platform validation
// ============================================================================

/// Request to validate one text for several platforms
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// Content to validate
    pub content: String,
    /// Platform names to validate against
    pub platforms: Vec<String>,
    /// Validate as a reply (leading mentions are free)
    pub is_reply: bool,
}

/// Response containing validation results
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    /// Whether content is valid for all requested platforms
    pub valid: bool,
    /// Per-platform validation results, in request order
    pub results: Vec<PlatformValidation>,
}

/// Validation result for a single platform
#[derive(Debug, Clone, Serialize)]
pub struct PlatformValidation {
    pub platform: String,
    pub valid: bool,
    pub errors: Vec<String>,
    /// Non-blocking notes
    pub warnings: Vec<String>,
    /// `None` for unknown platforms
    pub effective_length: Option<usize>,
    /// Units left before the limit; negative when over
    pub remaining: Option<i64>,
}

/// Validates content against a table of platform capabilities
///
/// # Example
///
/// ```
/// use libplurtext::validation::{ValidationRequest, ValidationService};
///
/// let service = ValidationService::builtin();
/// let response = service.validate(ValidationRequest {
///     content: "Hello decentralized world!".to_string(),
///     platforms: vec!["bluesky".to_string(), "mastodon".to_string()],
///     is_reply: false,
/// });
/// assert!(response.valid);
/// assert_eq!(response.results[0].remaining, Some(274));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationService {
    capabilities: Arc<CapabilityTable>,
}

impl ValidationService {
    pub fn new(capabilities: Arc<CapabilityTable>) -> Self {
        Self { capabilities }
    }

    /// Service over the built-in capability rows
    pub fn builtin() -> Self {
        Self::new(Arc::new(CapabilityTable::builtin()))
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Validate content for every requested platform
    pub fn validate(&self, request: ValidationRequest) -> ValidationResponse {
        let results: Vec<PlatformValidation> = request
            .platforms
            .iter()
            .map(|name| self.validate_for_platform(&request.content, name, request.is_reply))
            .collect();

        ValidationResponse {
            valid: results.iter().all(|r| r.valid),
            results,
        }
    }

    /// `true` if content is valid for all specified platforms
    pub fn is_valid(&self, content: &str, platforms: &[String]) -> bool {
        self.validate(ValidationRequest {
            content: content.to_string(),
            platforms: platforms.to_vec(),
            is_reply: false,
        })
        .valid
    }

    /// Text limits of the requested platforms (`None` when unknown)
    pub fn get_limits(&self, platforms: &[String]) -> HashMap<String, Option<usize>> {
        platforms
            .iter()
            .map(|name| {
                let limit = self.capabilities.get(name).map(|c| c.max_text_length);
                (name.clone(), limit)
            })
            .collect()
    }

    fn validate_for_platform(&self, content: &str, name: &str, is_reply: bool) -> PlatformValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if content.trim().is_empty() {
            warnings.push("Content is empty or whitespace-only".to_string());
        }

        let Some(platform) = self.capabilities.get(name) else {
            warnings.push(format!(
                "Unknown platform '{}', skipping platform-specific validation",
                name
            ));
            return PlatformValidation {
                platform: name.to_string(),
                valid: true,
                errors,
                warnings,
                effective_length: None,
                remaining: None,
            };
        };

        let effective_length = counter::effective_length(content, platform, is_reply);
        if let Err(e) = validate_content(content, platform, is_reply) {
            errors.push(validation_message(e));
        }

        debug!(
            "Validated {} units for {} (limit {}): {} error(s)",
            effective_length,
            platform.name,
            platform.max_text_length,
            errors.len()
        );

        PlatformValidation {
            platform: platform.name.clone(),
            valid: errors.is_empty(),
            errors,
            warnings,
            effective_length: Some(effective_length),
            remaining: Some(platform.max_text_length as i64 - effective_length as i64),
        }
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validation_message(error: PlurtextError) -> String {
    match error {
        PlurtextError::Validation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
