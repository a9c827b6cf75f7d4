//! Fuzzy matching between a candidate gloss and existing cluster glosses.
//!
//! Used only to rank merge suggestions for the annotator. Merging is always
//! an explicit user action.

/// POS tags treated as pronouns.
pub const PRONOUN_TAGS: [&str; 2] = ["PRP", "PRP$"];

/// Whether a POS tag marks a pronoun.
#[must_use]
pub fn is_pronoun_tag(tag: &str) -> bool {
    PRONOUN_TAGS.contains(&tag)
}

/// Word-level Levenshtein distance between two glosses.
///
/// Both glosses are lowercased and split on whitespace. The result is the
/// smallest character edit distance over all word pairs, so "the President"
/// still scores 0 against "President Obama".
///
/// Returns `None` if either gloss has no words.
///
/// # Examples
///
/// ```
/// use kbpo_core::similarity::word_levenshtein;
///
/// assert_eq!(word_levenshtein("President Obama", "the president"), Some(0));
/// assert_eq!(word_levenshtein("Obama", "Osama"), Some(1));
/// assert_eq!(word_levenshtein("", "Obama"), None);
/// ```
#[must_use]
pub fn word_levenshtein(a: &str, b: &str) -> Option<usize> {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    let words_b: Vec<&str> = b_lower.split_whitespace().collect();
    a_lower
        .split_whitespace()
        .flat_map(|wa| words_b.iter().map(move |wb| strsim::levenshtein(wa, wb)))
        .min()
}
