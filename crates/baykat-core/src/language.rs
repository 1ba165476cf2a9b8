//! Heuristic language detection
//!
//! Used only when the caller did not ask for a language explicitly. Counts
//! marker substrings in the final response text: two Wolof markers tag the
//! reply `wo`, otherwise two English markers tag it `en`, otherwise it stays
//! French. Wolof is checked first on purpose — Wolof farm vocabulary shows
//! up inside otherwise French sentences and should win.

use crate::types::Language;

/// Common Wolof words and greetings. Matched as bare substrings; several are
/// crop names that double as routing keywords, which is fine here.
const WOLOF_MARKERS: &[&str] = &[
    "nanga def",
    "jere jef",
    "ba beneen",
    "dina",
    "mooy",
    "gerte",
    "dugub",
    "malo",
    "mbaxal",
    "taw",
    "ndox",
    "bey",
    "tool",
    "suuf",
    "nawet",
    "noor",
];

/// English function words, space-delimited so they only match as whole words
/// ("and" alone would fire inside French "quand").
const ENGLISH_MARKERS: &[&str] = &[
    " the ", " is ", " are ", " you ", " your ", " for ", " with ", " and ", " will ", " have ",
];

const MARKER_THRESHOLD: usize = 2;

/// Detect the language of a response text. Priority: Wolof, then English,
/// then the French default.
pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();

    let wolof = WOLOF_MARKERS.iter().filter(|m| lower.contains(*m)).count();
    if wolof >= MARKER_THRESHOLD {
        return Language::Wo;
    }

    // Pad so markers can match at the start and end of the text too.
    let padded = format!(" {} ", lower);
    let english = ENGLISH_MARKERS.iter().filter(|m| padded.contains(*m)).count();
    if english >= MARKER_THRESHOLD {
        return Language::En;
    }

    Language::Fr
}
