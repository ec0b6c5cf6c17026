//! Facet assembly
//!
//! Combines the three scanners into one ordered, non-overlapping facet list
//! and resolves mentions through a [`MentionResolver`].

use std::fmt;
use std::str::FromStr;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlurtextError, Result};
use crate::resolver::MentionResolver;
use crate::text::scanner::{RawSpan, ScanKind, Scanner};
use crate::types::{Facet, FacetFeature, MentionTarget};

/// What to do with a mention whose handle could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionPolicy {
    /// Abort extraction with [`PlurtextError::MentionResolutionFailed`]
    #[default]
    Fail,
    /// Drop the mention facet and continue
    Omit,
    /// Keep the facet as [`MentionTarget::Unresolved`]
    Keep,
}

impl MentionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Omit => "omit",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for MentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MentionPolicy {
    type Err = PlurtextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "omit" => Ok(Self::Omit),
            "keep" => Ok(Self::Keep),
            other => Err(PlurtextError::InvalidInput(format!(
                "Unknown mention policy '{}' (expected fail, omit or keep)",
                other
            ))),
        }
    }
}

/// Scan `text` for facet candidates without resolving mentions
///
/// Candidates are sorted by start offset and never overlap. When two matches
/// overlap, the one starting first wins; at equal starts the shorter wins.
///
/// ```
/// use libplurtext::text::{scan_candidates, ScanKind};
///
/// let found = scan_candidates("see https://example.com/(#notatag) #tag");
/// let kinds: Vec<ScanKind> = found.iter().map(|c| c.kind).collect();
/// assert_eq!(kinds, vec![ScanKind::Url, ScanKind::Hashtag]);
/// ```
pub fn scan_candidates(text: &str) -> Vec<RawSpan<'_>> {
    let mut all: Vec<RawSpan<'_>> = Scanner::urls(text)
        .chain(Scanner::mentions(text))
        .chain(Scanner::hashtags(text))
        .collect();
    all.sort_by_key(|raw| (raw.span.byte_start, raw.span.len()));

    let mut kept = Vec::with_capacity(all.len());
    let mut last_end = 0;
    for raw in all {
        if raw.span.byte_start < last_end {
            debug!(
                "Dropping {:?} candidate at {}..{} overlapping an earlier match",
                raw.kind, raw.span.byte_start, raw.span.byte_end
            );
            continue;
        }
        last_end = raw.span.byte_end;
        kept.push(raw);
    }
    kept
}

/// Extract link, mention and hashtag facets from `text`
///
/// Mentions are resolved concurrently; the result is always in text order.
/// Resolution failures are handled according to `policy`; under
/// [`MentionPolicy::Fail`] the first failing mention in text order is
/// reported.
///
/// # Examples
///
/// ```
/// use libplurtext::resolver::StaticResolver;
/// use libplurtext::text::{extract_facets, MentionPolicy};
/// use libplurtext::types::FacetKind;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = StaticResolver::new().with("alice.com", "did:plc:alice");
/// let facets = extract_facets("hi @alice.com #rust", &resolver, MentionPolicy::Fail)
///     .await
///     .unwrap();
/// assert_eq!(facets[0].kind(), FacetKind::Mention);
/// assert_eq!(facets[1].kind(), FacetKind::Tag);
/// # }
/// ```
pub async fn extract_facets<R>(text: &str, resolver: &R, policy: MentionPolicy) -> Result<Vec<Facet>>
where
    R: MentionResolver + ?Sized,
{
    let candidates = scan_candidates(text);
    debug!(
        "Found {} facet candidate(s) in {} bytes",
        candidates.len(),
        text.len()
    );

    let futures = candidates
        .iter()
        .map(|raw| build_facet(raw, resolver, policy));

    // Completion order is irrelevant: results line up with `candidates`
    join_all(futures)
        .await
        .into_iter()
        .filter_map(|facet| facet.transpose())
        .collect()
}

async fn build_facet<R>(raw: &RawSpan<'_>, resolver: &R, policy: MentionPolicy) -> Result<Option<Facet>>
where
    R: MentionResolver + ?Sized,
{
    let feature = match raw.kind {
        ScanKind::Url => FacetFeature::Link {
            uri: raw.payload().to_string(),
        },
        ScanKind::Hashtag => FacetFeature::Tag {
            tag: raw.payload().to_string(),
        },
        ScanKind::Mention => {
            let handle = raw.payload();
            match resolver.resolve(handle).await {
                Ok(did) => FacetFeature::Mention(MentionTarget::Resolved {
                    handle: handle.to_string(),
                    did,
                }),
                Err(cause) => match policy {
                    MentionPolicy::Fail => {
                        return Err(PlurtextError::MentionResolutionFailed {
                            handle: handle.to_string(),
                            cause,
                        })
                    }
                    MentionPolicy::Omit => {
                        warn!("Omitting mention @{}: {}", handle, cause);
                        return Ok(None);
                    }
                    MentionPolicy::Keep => {
                        debug!("Keeping unresolved mention @{}: {}", handle, cause);
                        FacetFeature::Mention(MentionTarget::Unresolved {
                            handle: handle.to_string(),
                            reason: cause.to_string(),
                        })
                    }
                },
            }
        }
    };

    Ok(Some(Facet::new(raw.span, feature)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::resolver::mock::MockResolver;
    use crate::resolver::StaticResolver;
    use crate::types::{FacetKind, Span};
    use std::time::Duration;

    fn alice() -> StaticResolver {
        StaticResolver::new().with("alice.com", "did:plc:alice")
    }

    #[tokio::test]
    async fn test_mention_hashtag_and_link_in_order() {
        let text = "@alice.com check out #ocaml! https://ocaml.org";
        let facets = extract_facets(text, &alice(), MentionPolicy::Fail)
            .await
            .unwrap();

        assert_eq!(facets.len(), 3);

        assert_eq!(facets[0].span(), Span::new(0, 10));
        assert_eq!(
            facets[0].feature(),
            &FacetFeature::Mention(MentionTarget::Resolved {
                handle: "alice.com".to_string(),
                did: "did:plc:alice".to_string(),
            })
        );

        assert_eq!(facets[1].span().slice(text), Some("#ocaml"));
        assert_eq!(
            facets[1].feature(),
            &FacetFeature::Tag {
                tag: "ocaml".to_string()
            }
        );

        assert_eq!(facets[2].span().slice(text), Some("https://ocaml.org"));
        assert_eq!(facets[2].kind(), FacetKind::Link);
    }

    #[tokio::test]
    async fn test_no_mention_without_word_boundary() {
        let facets = extract_facets("not@right", &alice(), MentionPolicy::Fail)
            .await
            .unwrap();
        assert!(facets.iter().all(|f| f.kind() != FacetKind::Mention));
        assert!(facets.is_empty());
    }

    #[tokio::test]
    async fn test_no_link_without_scheme() {
        let facets = extract_facets("start middle.com end", &alice(), MentionPolicy::Fail)
            .await
            .unwrap();
        assert!(facets.is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_yields_no_facets() {
        let resolver = MockResolver::default();
        let facets = extract_facets("just words, nothing else.", &resolver, MentionPolicy::Fail)
            .await
            .unwrap();
        assert!(facets.is_empty());
        assert_eq!(resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_hashtag_inside_url_is_not_a_facet() {
        let text = "see https://example.com/wiki/(#anchor) ok";
        let facets = extract_facets(text, &alice(), MentionPolicy::Fail)
            .await
            .unwrap();
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].kind(), FacetKind::Link);
        assert_eq!(
            facets[0].span().slice(text),
            Some("https://example.com/wiki/(#anchor)")
        );
    }

    #[tokio::test]
    async fn test_extraction_is_idempotent() {
        let text = "@alice.com #one https://a.co #two";
        let first = extract_facets(text, &alice(), MentionPolicy::Fail)
            .await
            .unwrap();
        let second = extract_facets(text, &alice(), MentionPolicy::Fail)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_text_order_regardless_of_completion_order() {
        let resolver = MockResolver::with_identities([
            ("slow.com", "did:plc:slow"),
            ("fast.com", "did:plc:fast"),
        ])
        .handle_delay("slow.com", Duration::from_millis(50));

        let text = "@slow.com then @fast.com";
        let facets = extract_facets(text, &resolver, MentionPolicy::Fail)
            .await
            .unwrap();

        let dids: Vec<_> = facets
            .iter()
            .map(|f| match f.feature() {
                FacetFeature::Mention(target) => target.did().unwrap().to_string(),
                other => panic!("Expected mention, got {:?}", other),
            })
            .collect();
        assert_eq!(dids, vec!["did:plc:slow", "did:plc:fast"]);
        assert_eq!(resolver.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mentions_resolve_concurrently() {
        let resolver = MockResolver::with_identities([
            ("a.com", "did:plc:a"),
            ("b.com", "did:plc:b"),
            ("c.com", "did:plc:c"),
        ])
        .delay(Duration::from_millis(100));

        let start = std::time::Instant::now();
        extract_facets("@a.com @b.com @c.com", &resolver, MentionPolicy::Fail)
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_fail_policy_reports_first_failure_in_text_order() {
        let resolver = MockResolver::with_identities([("ok.com", "did:plc:ok")])
            .failure("late.com", ResolveError::Unavailable("down".to_string()))
            .handle_delay("first.com", Duration::from_millis(40));

        let result = extract_facets(
            "@ok.com @first.com @late.com",
            &resolver,
            MentionPolicy::Fail,
        )
        .await;

        match result {
            Err(PlurtextError::MentionResolutionFailed { handle, cause }) => {
                assert_eq!(handle, "first.com");
                assert_eq!(cause, ResolveError::NotFound);
            }
            other => panic!("Expected MentionResolutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_omit_policy_drops_failed_mentions() {
        let text = "@alice.com and @ghost.com #tag";
        let facets = extract_facets(text, &alice(), MentionPolicy::Omit)
            .await
            .unwrap();

        let kinds: Vec<_> = facets.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![FacetKind::Mention, FacetKind::Tag]);
        assert_eq!(facets[0].span().slice(text), Some("@alice.com"));
    }

    #[tokio::test]
    async fn test_keep_policy_keeps_unresolved_mentions() {
        let text = "hello @ghost.com";
        let facets = extract_facets(text, &alice(), MentionPolicy::Keep)
            .await
            .unwrap();

        assert_eq!(facets.len(), 1);
        assert_eq!(
            facets[0].feature(),
            &FacetFeature::Mention(MentionTarget::Unresolved {
                handle: "ghost.com".to_string(),
                reason: "handle not found".to_string(),
            })
        );
        assert!(facets[0].to_wire().is_none());
    }

    #[tokio::test]
    async fn test_resolver_receives_handle_without_marker() {
        let resolver = MockResolver::default();
        let _ = extract_facets("(@carol.dev.)", &resolver, MentionPolicy::Omit).await;
        assert_eq!(resolver.calls(), vec!["carol.dev"]);
    }

    #[tokio::test]
    async fn test_facets_sorted_and_disjoint() {
        let text = "#a @alice.com https://x.io/#b (#c) @alice.com.";
        let facets = extract_facets(text, &alice(), MentionPolicy::Fail)
            .await
            .unwrap();

        for pair in facets.windows(2) {
            assert!(pair[0].span().byte_end <= pair[1].span().byte_start);
        }
        assert_eq!(facets.len(), 5);
    }

    #[test]
    fn test_scan_candidates_needs_no_resolver() {
        let found = scan_candidates("@bob #rust https://rust-lang.org");
        let texts: Vec<_> = found.iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["@bob", "#rust", "https://rust-lang.org"]);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail".parse::<MentionPolicy>().unwrap(), MentionPolicy::Fail);
        assert_eq!(" Omit ".parse::<MentionPolicy>().unwrap(), MentionPolicy::Omit);
        assert_eq!("KEEP".parse::<MentionPolicy>().unwrap(), MentionPolicy::Keep);
        assert!("drop".parse::<MentionPolicy>().is_err());
        assert_eq!(MentionPolicy::default(), MentionPolicy::Fail);
        assert_eq!(MentionPolicy::Omit.to_string(), "omit");
    }
}
