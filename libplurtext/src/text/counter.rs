//! Platform-specific effective length of a post
//!
//! The effective length is what a platform's composer counts against its
//! limit: links cost a fixed amount once the platform wraps them, wide code
//! points may cost two units, and a reply's leading `@handle` run is free.
//! Effective length is measured in weighted units and is never used as a
//! byte offset.

use std::borrow::Cow;

use crate::platforms::PlatformCapability;
use crate::text::classify::weighted_width;
use crate::text::scanner::Scanner;

/// Narrow stand-in for a wrapped link; never part of a handle
const URL_PLACEHOLDER: char = '_';

/// Effective length of `text` on `platform`
///
/// # Examples
///
/// ```
/// use libplurtext::platforms;
/// use libplurtext::text::effective_length;
///
/// let twitter = platforms::capability("twitter").unwrap();
/// // The link counts as 23 units regardless of its length
/// assert_eq!(effective_length("read https://example.com/a/very/long/path", twitter, false), 28);
/// // Leading reply mentions are free
/// assert_eq!(effective_length("@bob @carol thanks!", twitter, true), 7);
/// ```
pub fn effective_length(text: &str, platform: &PlatformCapability, is_reply: bool) -> usize {
    let substituted = substitute_urls(text, platform.url_weight);
    let counted = if is_reply {
        strip_reply_mentions(&substituted)
    } else {
        &substituted
    };
    weighted_width(counted, platform.weighting)
}

/// Effective length of raw bytes, skipping invalid UTF-8 sequences
///
/// Invalid sequences contribute nothing to the count. This is lenient by
/// choice: a malformed byte never aborts counting, but the result is only
/// meaningful for input that is mostly valid UTF-8.
pub fn effective_length_bytes(bytes: &[u8], platform: &PlatformCapability, is_reply: bool) -> usize {
    effective_length(&decode_lenient(bytes), platform, is_reply)
}

/// `true` when the effective length fits the platform limit
pub fn is_valid(text: &str, platform: &PlatformCapability, is_reply: bool) -> bool {
    effective_length(text, platform, is_reply) <= platform.max_text_length
}

/// Units left before the limit; negative when over
pub fn remaining(text: &str, platform: &PlatformCapability, is_reply: bool) -> i64 {
    platform.max_text_length as i64 - effective_length(text, platform, is_reply) as i64
}

/// Decode UTF-8, dropping invalid sequences instead of failing
pub fn decode_lenient(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let mut out = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            Cow::Owned(out)
        }
    }
}

fn substitute_urls(text: &str, url_weight: Option<usize>) -> Cow<'_, str> {
    let Some(weight) = url_weight else {
        return Cow::Borrowed(text);
    };

    let mut urls = Scanner::urls(text).peekable();
    if urls.peek().is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for url in urls {
        let start = url.span.byte_start as usize;
        out.push_str(&text[last..start]);
        out.extend(std::iter::repeat(URL_PLACEHOLDER).take(weight));
        last = url.span.byte_end as usize;
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Drop the leading run of mentions and the whitespace after each one
///
/// Handles are delimited exactly as the mention scanner delimits them, so
/// a trailing `.` or `-` after a handle is counted.
fn strip_reply_mentions(text: &str) -> &str {
    let mut rest = 0;
    for mention in Scanner::mentions(text) {
        if mention.span.byte_start as usize != rest {
            break;
        }
        let end = mention.span.byte_end as usize;
        let after = text[end..].trim_start();
        rest = text.len() - after.len();
        if rest == end {
            break;
        }
    }
    &text[rest..]
}
