/*!
 * Text normalization for cross-script matching.
 *
 * Both scene narration and subtitle cue text go through the same
 * canonicalization before they are compared:
 * - NFKC folds full-width, half-width and compatibility characters
 * - full case folding (so `ß` compares equal to `ss`)
 * - everything except letters, numbers and (optionally) combining marks is dropped
 */

use caseless::default_case_fold_str;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// Normalize text for comparison, keeping combining marks.
///
/// Thai, Devanagari and other scripts carry obligatory vowel signs and tone
/// marks in the `Mn`/`Mc` categories; dropping them would make distinct words
/// collide. This is the variant used for alignment.
pub fn normalize(text: &str) -> String {
    fold(text, true)
}

/// Normalize text for comparison, discarding combining marks as well.
pub fn normalize_without_marks(text: &str) -> String {
    fold(text, false)
}

fn fold(text: &str, keep_marks: bool) -> String {
    let composed: String = text.nfkc().collect();
    let folded = default_case_fold_str(&composed);
    // Folding and filtering can both leave sequences that compose further
    // (a dropped joiner between a letter and its mark), so recompose after each.
    let filtered: String = folded
        .nfkc()
        .filter(|c| is_kept(*c, keep_marks))
        .collect();
    filtered.nfc().collect()
}

fn is_kept(c: char, keep_marks: bool) -> bool {
    use GeneralCategory::*;

    match get_general_category(c) {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter => true,
        DecimalNumber | LetterNumber | OtherNumber => true,
        NonspacingMark | SpacingMark | EnclosingMark => keep_marks,
        _ => false,
    }
}
