//! Text analysis: entity scanning, facet assembly and weighted counting
//!
//! Scanning and counting are synchronous and pure. Mention resolution inside
//! [`extract_facets`] is the only async step.

pub mod classify;
pub mod counter;
pub mod facets;
pub mod scanner;

pub use counter::{effective_length, effective_length_bytes, is_valid, remaining};
pub use facets::{extract_facets, scan_candidates, MentionPolicy};
pub use scanner::{RawSpan, ScanKind, Scanner};
