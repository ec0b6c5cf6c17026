//! Display-width classification of code points

use crate::platforms::CharWeighting;

/// Inclusive ranges of code points that render double-width.
///
/// Sorted and disjoint; looked up by binary search.
const WIDE_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115F),   // Hangul Jamo initial consonants
    (0x2E80, 0x303E),   // CJK radicals, Kangxi, ideographic description, CJK symbols
    (0x3041, 0x33FF),   // Hiragana, Katakana, Bopomofo, Hangul compatibility Jamo, CJK compat
    (0x3400, 0x4DBF),   // CJK extension A
    (0x4E00, 0x9FFF),   // CJK unified ideographs
    (0xA000, 0xA4CF),   // Yi
    (0xAC00, 0xD7A3),   // Hangul syllables
    (0xF900, 0xFAFF),   // CJK compatibility ideographs
    (0xFE30, 0xFE4F),   // CJK compatibility forms
    (0xFF00, 0xFF60),   // Fullwidth forms
    (0xFFE0, 0xFFE6),   // Fullwidth signs
    (0x1F000, 0x1FAFF), // Mahjong through symbols and pictographs extended-A
    (0x20000, 0x2FFFD), // Supplementary ideographic plane
    (0x30000, 0x3FFFD), // Tertiary ideographic plane
];

/// Whether `c` renders double-width
pub fn is_wide(c: char) -> bool {
    let cp = c as u32;
    WIDE_RANGES
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Weight of a single code point: 2 for wide, 1 otherwise
pub fn weight(c: char) -> usize {
    if is_wide(c) {
        2
    } else {
        1
    }
}

/// Sum of code point weights under a platform's weighting rule
pub fn weighted_width(text: &str, weighting: CharWeighting) -> usize {
    match weighting {
        CharWeighting::Uniform => text.chars().count(),
        CharWeighting::DisplayWidth => text.chars().map(weight).sum(),
    }
}
