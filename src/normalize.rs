//! Normalizing raw OCR output before it's compared or written out.
//!
//! Tesseract output is noisy: stray punctuation, misread digits, and the
//! occasional non-ASCII garbage character. We derive two strings from each
//! reading: an aggressively-stripped *comparison key* used only to decide
//! whether the on-screen text changed, and a lightly-stripped *display text*
//! that ends up in the subtitle file.

use lazy_static::lazy_static;
use regex::Regex;

/// A pluggable spell-correction pass, applied to raw OCR text before we
/// build a comparison key. Implementations should replace misrecognized
/// tokens with nearby dictionary forms, without inserting or deleting
/// tokens.
pub trait SpellCorrect {
    /// Correct likely OCR misreadings in `text`.
    fn correct(&self, text: &str) -> String;
}

/// A spell-corrector which changes nothing. Used when no dictionary is
/// available for the subtitle language.
pub struct NoopSpeller;

impl SpellCorrect for NoopSpeller {
    fn correct(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Reduce raw OCR text to a key suitable for frame-over-frame comparison.
///
/// After spell-correction we remove everything OCR gets wrong most often:
/// whitespace, the characters `#!'_*=`, and the digits 1-9. The digit 0 is
/// deliberately kept: it's misread as the letter O so consistently that
/// stripping it destabilizes comparisons. Anything outside printable ASCII
/// is dropped last. The result may be empty.
pub fn normalize_for_comparison(raw: &str, speller: &dyn SpellCorrect) -> String {
    lazy_static! {
        static ref NOISE: Regex = Regex::new(r"[\s#!'_*=1-9]").unwrap();
    }
    let corrected = speller.correct(raw);
    NOISE
        .replace_all(&corrected, "")
        .chars()
        .filter(|c| c.is_ascii_graphic())
        .collect()
}

/// Reduce raw OCR text to the form we write into the subtitle file.
///
/// Much lighter than the comparison key: we only remove characters that are
/// almost always OCR artifacts in dialog, and keep accented and other
/// non-ASCII characters intact. Surrounding whitespace is trimmed because
/// Tesseract terminates its output with a newline and a form feed, which
/// would otherwise corrupt the SRT block structure.
pub fn normalize_for_display(raw: &str) -> String {
    lazy_static! {
        static ref ARTIFACTS: Regex = Regex::new(r"[_=*#¢1-9]").unwrap();
    }
    ARTIFACTS.replace_all(raw, "").trim().to_owned()
}
