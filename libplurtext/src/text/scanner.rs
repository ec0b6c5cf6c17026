//! Pattern scanners for links, mentions and hashtags
//!
//! Each scanner walks the unmodified input once and yields [`RawSpan`]s with
//! UTF-8 byte offsets. Scanners are independent of one another, lazy, and
//! restartable: clone one or call [`Scanner::restart`] to walk the text
//! again.
//!
//! Candidates come from a regular expression; the word-boundary check before
//! the marker and the trailing-punctuation trim are done by hand, since the
//! `regex` crate has no look-behind.
//!
//! ```
//! use libplurtext::text::scanner::Scanner;
//!
//! let text = "ping @alice.com about #rust";
//! let handles: Vec<&str> = Scanner::mentions(text).map(|m| m.text).collect();
//! assert_eq!(handles, vec!["@alice.com"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{FacetKind, Span};

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[a-zA-Z0-9][^\s<>]*").expect("url pattern is valid"));
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[a-zA-Z0-9.-]+").expect("mention pattern is valid"));
static HASHTAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[a-zA-Z0-9_]+").expect("hashtag pattern is valid"));

/// Characters that may directly precede a marker besides whitespace
const OPENING_PUNCTUATION: &[char] = &['(', '[', '{', '<', '"', '\'', '\u{201C}', '\u{2018}'];

/// Trailing characters treated as sentence punctuation after a link
const URL_TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '\u{201D}', '\u{2019}',
];

/// What a scanner looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Url,
    Mention,
    Hashtag,
}

impl ScanKind {
    fn pattern(&self) -> &'static Regex {
        match self {
            ScanKind::Url => &*URL_PATTERN,
            ScanKind::Mention => &*MENTION_PATTERN,
            ScanKind::Hashtag => &*HASHTAG_PATTERN,
        }
    }

    /// Length of the marker that starts a match (`@`, `#`; links keep theirs)
    fn marker_len(&self) -> usize {
        match self {
            ScanKind::Url => 0,
            ScanKind::Mention | ScanKind::Hashtag => 1,
        }
    }

    /// Length of `candidate` once trailing punctuation is dropped
    fn trimmed_len(&self, candidate: &str) -> usize {
        match self {
            ScanKind::Url => trim_url(candidate),
            ScanKind::Mention => candidate.trim_end_matches(&['.', '-'][..]).len(),
            ScanKind::Hashtag => candidate.len(),
        }
    }

    /// Whether a match at byte `start` may begin here
    ///
    /// Mentions and hashtags need a word boundary. A link only needs to not
    /// continue a word, so `link:https://...` still matches.
    fn starts_token(&self, text: &str, start: usize) -> bool {
        match self {
            ScanKind::Url => !text[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric()),
            ScanKind::Mention | ScanKind::Hashtag => at_word_boundary(text, start),
        }
    }

    pub fn facet_kind(&self) -> FacetKind {
        match self {
            ScanKind::Url => FacetKind::Link,
            ScanKind::Mention => FacetKind::Mention,
            ScanKind::Hashtag => FacetKind::Tag,
        }
    }
}

/// A match located by a scanner, borrowing the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSpan<'t> {
    pub kind: ScanKind,
    pub span: Span,
    /// The matched text, marker included
    pub text: &'t str,
}

impl<'t> RawSpan<'t> {
    /// The matched text without its marker: the handle for a mention, the tag
    /// for a hashtag, the full URI for a link
    pub fn payload(&self) -> &'t str {
        &self.text[self.kind.marker_len()..]
    }
}

/// Lazy scanner over one text for one kind of match
#[derive(Debug, Clone)]
pub struct Scanner<'t> {
    kind: ScanKind,
    text: &'t str,
    pos: usize,
}

impl<'t> Scanner<'t> {
    pub fn new(kind: ScanKind, text: &'t str) -> Self {
        Self { kind, text, pos: 0 }
    }

    pub fn urls(text: &'t str) -> Self {
        Self::new(ScanKind::Url, text)
    }

    pub fn mentions(text: &'t str) -> Self {
        Self::new(ScanKind::Mention, text)
    }

    pub fn hashtags(text: &'t str) -> Self {
        Self::new(ScanKind::Hashtag, text)
    }

    pub fn kind(&self) -> ScanKind {
        self.kind
    }

    /// Rewind to the start of the text
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<'t> Iterator for Scanner<'t> {
    type Item = RawSpan<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let candidate = self.kind.pattern().find_at(self.text, self.pos)?;
            self.pos = candidate.end();

            if !self.kind.starts_token(self.text, candidate.start()) {
                continue;
            }

            let len = self.kind.trimmed_len(candidate.as_str());
            if len <= self.kind.marker_len() {
                continue;
            }

            let start = candidate.start();
            let end = start + len;
            let (Ok(byte_start), Ok(byte_end)) = (u32::try_from(start), u32::try_from(end)) else {
                // Offsets past u32::MAX cannot be expressed on the wire
                self.pos = self.text.len();
                return None;
            };

            return Some(RawSpan {
                kind: self.kind,
                span: Span::new(byte_start, byte_end),
                text: &self.text[start..end],
            });
        }
        None
    }
}

/// Whether a marker at byte `start` begins a new word
fn at_word_boundary(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || OPENING_PUNCTUATION.contains(&c),
    }
}

/// Drop sentence punctuation and unbalanced closing brackets from a link
fn trim_url(candidate: &str) -> usize {
    let mut end = candidate.len();
    while let Some(last) = candidate[..end].chars().next_back() {
        let head = &candidate[..end];
        let drop = match last {
            ')' => unbalanced(head, '(', ')'),
            ']' => unbalanced(head, '[', ']'),
            '}' => unbalanced(head, '{', '}'),
            c => URL_TRAILING_PUNCTUATION.contains(&c),
        };
        if !drop {
            break;
        }
        end -= last.len_utf8();
    }
    end
}

fn unbalanced(s: &str, open: char, close: char) -> bool {
    s.matches(close).count() > s.matches(open).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(scanner: Scanner<'_>) -> Vec<&str> {
        scanner.map(|m| m.text).collect()
    }

    // ------------------------------------------------------------------
    // Mentions
    // ------------------------------------------------------------------

    #[test]
    fn test_mention_at_start_of_text() {
        let text = "@alice.com check out #ocaml! https://ocaml.org";
        let found: Vec<_> = Scanner::mentions(text).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "@alice.com");
        assert_eq!(found[0].span, Span::new(0, 10));
        assert_eq!(found[0].payload(), "alice.com");
    }

    #[test]
    fn test_mention_requires_word_boundary() {
        assert!(texts(Scanner::mentions("not@right")).is_empty());
        assert!(texts(Scanner::mentions("mail me: bob@example.com")).is_empty());
    }

    #[test]
    fn test_mention_after_opening_punctuation() {
        assert_eq!(texts(Scanner::mentions("(@carol.dev)")), vec!["@carol.dev"]);
        assert_eq!(texts(Scanner::mentions("\"@dan\" said")), vec!["@dan"]);
    }

    #[test]
    fn test_mention_stops_at_first_character_outside_class() {
        assert_eq!(texts(Scanner::mentions("hi @bob_smith")), vec!["@bob"]);
        assert_eq!(texts(Scanner::mentions("@eve, welcome")), vec!["@eve"]);
        assert_eq!(texts(Scanner::mentions("@eve!")), vec!["@eve"]);
    }

    #[test]
    fn test_mention_drops_trailing_sentence_dot() {
        assert_eq!(
            texts(Scanner::mentions("thanks @alice.bsky.social.")),
            vec!["@alice.bsky.social"]
        );
        assert!(texts(Scanner::mentions("@... nothing")).is_empty());
    }

    #[test]
    fn test_lone_and_doubled_markers() {
        assert!(texts(Scanner::mentions("@ alone")).is_empty());
        assert!(texts(Scanner::mentions("@@alice")).is_empty());
    }

    #[test]
    fn test_multiple_mentions() {
        let found: Vec<_> = Scanner::mentions("@a.com and @b.com").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].span, Span::new(11, 17));
    }

    // ------------------------------------------------------------------
    // Hashtags
    // ------------------------------------------------------------------

    #[test]
    fn test_hashtag_basic() {
        let found: Vec<_> = Scanner::hashtags("check out #ocaml! now").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "#ocaml");
        assert_eq!(found[0].payload(), "ocaml");
        assert_eq!(found[0].span, Span::new(10, 16));
    }

    #[test]
    fn test_hashtag_numeric_and_underscore() {
        assert_eq!(texts(Scanner::hashtags("#1 #rust_lang")), vec!["#1", "#rust_lang"]);
    }

    #[test]
    fn test_hashtag_requires_word_boundary() {
        assert!(texts(Scanner::hashtags("issue#42")).is_empty());
        assert!(texts(Scanner::hashtags("C# rocks")).is_empty());
    }

    #[test]
    fn test_hashtag_has_no_length_cap() {
        let tag = format!("#{}", "a".repeat(100));
        assert_eq!(texts(Scanner::hashtags(&tag)), vec![tag.as_str()]);
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    #[test]
    fn test_url_basic() {
        let text = "@alice.com check out #ocaml! https://ocaml.org";
        let found: Vec<_> = Scanner::urls(text).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "https://ocaml.org");
        assert_eq!(found[0].span, Span::new(29, 46));
        assert_eq!(found[0].payload(), "https://ocaml.org");
    }

    #[test]
    fn test_url_without_scheme_is_ignored() {
        assert!(texts(Scanner::urls("start middle.com end")).is_empty());
        assert!(texts(Scanner::urls("www.example.com")).is_empty());
    }

    #[test]
    fn test_url_requires_host() {
        assert!(texts(Scanner::urls("just https:// here")).is_empty());
        assert!(texts(Scanner::urls("http:///path")).is_empty());
    }

    #[test]
    fn test_url_trailing_punctuation_excluded() {
        assert_eq!(
            texts(Scanner::urls("see https://example.com/a, then")),
            vec!["https://example.com/a"]
        );
        assert_eq!(
            texts(Scanner::urls("go to http://example.com.")),
            vec!["http://example.com"]
        );
        assert_eq!(
            texts(Scanner::urls("really? https://example.com/?q=1!?")),
            vec!["https://example.com/?q=1"]
        );
    }

    #[test]
    fn test_url_parentheses() {
        assert_eq!(
            texts(Scanner::urls("(see https://example.com/page)")),
            vec!["https://example.com/page"]
        );
        assert_eq!(
            texts(Scanner::urls("https://en.wikipedia.org/wiki/Rust_(programming_language)")),
            vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)"]
        );
        assert_eq!(
            texts(Scanner::urls("(https://en.wikipedia.org/wiki/Rust_(language)).")),
            vec!["https://en.wikipedia.org/wiki/Rust_(language)"]
        );
    }

    #[test]
    fn test_url_keeps_query_and_fragment() {
        assert_eq!(
            texts(Scanner::urls("https://example.com/path?a=1&b=2#section end")),
            vec!["https://example.com/path?a=1&b=2#section"]
        );
    }

    #[test]
    fn test_url_cannot_continue_a_word() {
        assert!(texts(Scanner::urls("xhttps://example.com")).is_empty());
        assert!(texts(Scanner::urls("2https://example.com")).is_empty());
    }

    #[test]
    fn test_url_after_punctuation() {
        assert_eq!(
            texts(Scanner::urls("link:https://example.com")),
            vec!["https://example.com"]
        );
        let found: Vec<_> = Scanner::urls("src=https://example.com/a").collect();
        assert_eq!(found[0].span, Span::new(4, 25));
    }

    #[test]
    fn test_url_in_angle_brackets() {
        let text = "see <https://example.com/a> now";
        let found: Vec<_> = Scanner::urls(text).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "https://example.com/a");
        assert_eq!(found[0].span, Span::new(5, 26));
        assert_eq!(
            texts(Scanner::urls("<https://example.com/a>.")),
            vec!["https://example.com/a"]
        );
        assert_eq!(
            texts(Scanner::urls("https://example.com/a>b")),
            vec!["https://example.com/a"]
        );
    }

    // ------------------------------------------------------------------
    // Offsets and restartability
    // ------------------------------------------------------------------

    #[test]
    fn test_offsets_are_utf8_bytes() {
        // "日本 " is 7 bytes
        let text = "日本 @alice.com";
        let found: Vec<_> = Scanner::mentions(text).collect();
        assert_eq!(found[0].span, Span::new(7, 17));
        assert_eq!(found[0].span.slice(text), Some("@alice.com"));
    }

    #[test]
    fn test_emoji_before_hashtag() {
        let text = "🚀 #launch";
        let found: Vec<_> = Scanner::hashtags(text).collect();
        assert_eq!(found[0].span, Span::new(5, 12));
        assert_eq!(found[0].span.slice(text), Some("#launch"));
    }

    #[test]
    fn test_scanner_restarts() {
        let mut scanner = Scanner::hashtags("#a #b");
        assert_eq!(scanner.next().map(|m| m.text), Some("#a"));
        let snapshot = scanner.clone();
        assert_eq!(scanner.next().map(|m| m.text), Some("#b"));
        assert_eq!(scanner.next(), None);

        scanner.restart();
        assert_eq!(texts(scanner), vec!["#a", "#b"]);
        assert_eq!(texts(snapshot), vec!["#b"]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(Scanner::urls("").next(), None);
        assert_eq!(Scanner::mentions("").next(), None);
        assert_eq!(Scanner::hashtags("").next(), None);
    }
}
