//! Thread planning
//!
//! Turns pre-segmented texts and their attachments into an ordered list of
//! [`ThreadPost`]s, each validated on its own. Nothing is re-wrapped or
//! repaired: a chunk that does not fit is reported, not fixed.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlurtextError, Result, ThreadChunkInvalid, ThreadError};
use crate::platforms::PlatformCapability;
use crate::resolver::MentionResolver;
use crate::text::{extract_facets, MentionPolicy};
use crate::types::{MediaDescriptor, ThreadPost};
use crate::validation::{validate_attachments, validate_content};

/// Input to [`split_thread`]
///
/// `media_per_post[i]` and `alt_texts_per_post[i]` belong to `texts[i]`;
/// missing trailing lists mean "no media".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub media_per_post: Vec<Vec<MediaDescriptor>>,
    /// `alt_texts_per_post[i][j]` replaces the alt text of media `j` of post
    /// `i` when it is `Some`
    #[serde(default)]
    pub alt_texts_per_post: Option<Vec<Vec<Option<String>>>>,
}

impl ThreadRequest {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_media(mut self, media_per_post: Vec<Vec<MediaDescriptor>>) -> Self {
        self.media_per_post = media_per_post;
        self
    }

    pub fn with_alt_texts(mut self, alt_texts_per_post: Vec<Vec<Option<String>>>) -> Self {
        self.alt_texts_per_post = Some(alt_texts_per_post);
        self
    }

    fn check_shape(&self) -> Result<()> {
        if self.texts.is_empty() {
            return Err(PlurtextError::InvalidInput(
                "Thread must contain at least one post".to_string(),
            ));
        }

        if self.media_per_post.len() > self.texts.len() {
            return Err(PlurtextError::InvalidInput(format!(
                "{} media lists given for {} posts",
                self.media_per_post.len(),
                self.texts.len()
            )));
        }

        if let Some(alt_texts) = &self.alt_texts_per_post {
            if alt_texts.len() > self.texts.len() {
                return Err(PlurtextError::InvalidInput(format!(
                    "{} alt text lists given for {} posts",
                    alt_texts.len(),
                    self.texts.len()
                )));
            }
            for (index, alts) in alt_texts.iter().enumerate() {
                let media = self.media_per_post.get(index).map_or(0, Vec::len);
                if alts.len() > media {
                    return Err(PlurtextError::InvalidInput(format!(
                        "Post {} has {} alt texts but {} attachments",
                        index,
                        alts.len(),
                        media
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Plan a thread for `platform`
///
/// Each chunk gets its own facets (offsets local to the chunk) and is
/// validated independently. Chunks after the first are counted as replies
/// on platforms whose composer frees a reply's leading mentions.
/// Facet extraction runs for all chunks concurrently.
///
/// # Errors
///
/// - [`PlurtextError::InvalidInput`] when the request is malformed (no texts,
///   more media or alt text lists than posts).
/// - [`PlurtextError::Thread`] listing every failing chunk, in order.
pub async fn split_thread<R>(
    request: ThreadRequest,
    platform: &PlatformCapability,
    resolver: &R,
    policy: MentionPolicy,
) -> Result<Vec<ThreadPost>>
where
    R: MentionResolver + ?Sized,
{
    request.check_shape()?;

    let ThreadRequest {
        texts,
        mut media_per_post,
        alt_texts_per_post,
    } = request;

    media_per_post.resize_with(texts.len(), Vec::new);
    if let Some(alt_texts) = alt_texts_per_post {
        for (media, alts) in media_per_post.iter_mut().zip(alt_texts) {
            for (item, alt) in media.iter_mut().zip(alts) {
                if let Some(alt) = alt {
                    item.alt_text = Some(alt);
                }
            }
        }
    }

    debug!(
        "Planning {}-post thread for {}",
        texts.len(),
        platform.name
    );

    let facet_results = join_all(
        texts
            .iter()
            .map(|text| extract_facets(text, resolver, policy)),
    )
    .await;

    let mut posts = Vec::with_capacity(texts.len());
    let mut invalid = Vec::new();

    for (index, ((text, media), facets)) in texts
        .into_iter()
        .zip(media_per_post)
        .zip(facet_results)
        .enumerate()
    {
        let is_reply = index > 0 && platform.reply_mentions_free;
        let checked = facets.and_then(|facets| {
            validate_content(&text, platform, is_reply)?;
            validate_attachments(&media, platform)?;
            Ok(facets)
        });

        match checked {
            Ok(facets) => posts.push(ThreadPost {
                index,
                text,
                media,
                facets,
            }),
            Err(cause) => {
                debug!("Thread chunk {} is invalid: {}", index, cause);
                invalid.push(ThreadChunkInvalid {
                    index,
                    cause: Box::new(cause),
                });
            }
        }
    }

    if !invalid.is_empty() {
        return Err(ThreadError { chunks: invalid }.into());
    }

    info!("Planned {}-post thread for {}", posts.len(), platform.name);
    Ok(posts)
}
