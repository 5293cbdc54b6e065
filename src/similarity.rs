//! Jaccard similarity over the characters of two strings.

use std::collections::HashSet;

/// How similar are two strings, treating each as a set of its unique
/// characters? Returns the Jaccard index `|A ∩ B| / |A ∪ B|`, a value in
/// `[0, 1]`.
///
/// Two empty strings score 0, not 1: an all-empty stretch of OCR readings
/// must never look like a stable subtitle.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: HashSet<char> = a.chars().collect();
    let b: HashSet<char> = b.chars().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(1.0, similarity("abc", "abc"));
        assert_eq!(1.0, similarity("abc", "cba"));
        assert_eq!(0.0, similarity("abc", "xyz"));
        assert_eq!(0.5, similarity("ab", "abcd"));
        // Sets of unique characters, so repeats don't count.
        assert_eq!(1.0, similarity("aab", "abb"));
    }

    #[test]
    fn empty_strings_are_dissimilar() {
        assert_eq!(0.0, similarity("", ""));
        assert_eq!(0.0, similarity("", "abc"));
        assert_eq!(0.0, similarity("abc", ""));
    }

    #[test]
    fn symmetric_and_bounded() {
        let samples = ["", "a", "ab", "bonjour", "BONJOUR", "était", "0#!"];
        for x in samples {
            for y in samples {
                let s = similarity(x, y);
                assert_eq!(s, similarity(y, x), "{:?} vs {:?}", x, y);
                assert!((0.0..=1.0).contains(&s), "{:?} vs {:?}: {}", x, y, s);
            }
        }
    }
}
