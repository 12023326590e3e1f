//! Word capitalization for artist, album, title and genre strings.

use std::collections::HashSet;

/// Release abbreviations kept verbatim unless the caller supplies its own list.
pub const DEFAULT_ACRONYMS: [&str; 4] = ["OST", "EP", "LP", "feat"];

/// Words that are never re-cased. Matching is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acronyms(HashSet<String>);

impl Acronyms {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    /// An empty exception list: every word gets capitalized.
    pub fn none() -> Self {
        Self(HashSet::new())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }
}

impl Default for Acronyms {
    fn default() -> Self {
        Self::new(DEFAULT_ACRONYMS)
    }
}

/// A letter is any char whose upper and lower case forms differ.
pub fn is_letter(ch: char) -> bool {
    !ch.to_uppercase().eq(ch.to_lowercase())
}

/// Capitalize every maximal run of letters in `value`.
///
/// Runs found in `acronyms` are left alone. Every other run is lower-cased and
/// then gets its first char upper-cased, so `"mcCartney"` becomes
/// `"Mccartney"`. Non-letters, digits included, are copied verbatim.
pub fn normalize_case(value: &str, acronyms: &Acronyms) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word = String::new();
    for ch in value.chars() {
        if is_letter(ch) {
            word.push(ch);
        } else {
            flush_word(&mut out, &mut word, acronyms);
            out.push(ch);
        }
    }
    flush_word(&mut out, &mut word, acronyms);
    out
}

/// Lower-case the word, then upper-case its first char.
pub fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn flush_word(out: &mut String, word: &mut String, acronyms: &Acronyms) {
    if word.is_empty() {
        return;
    }
    if acronyms.contains(word) {
        out.push_str(word);
    } else {
        out.push_str(&capitalize(word));
    }
    word.clear();
}
