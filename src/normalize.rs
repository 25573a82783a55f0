use std::sync::LazyLock;

use regex::Regex;

static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\(.*\)").unwrap());
static SLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/.*").unwrap());
static HYPHEN_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)-\s+.*").unwrap());
static FEAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)feat\..*").unwrap());

/// Cleans up a search field to improve the odds of a fuzzy match.
///
/// Removes, in order:
/// - everything from the first `(` to the last `)`, e.g. `(Remastered 2011)`
/// - a forward slash and the text that follows
/// - a hyphen followed by whitespace, and the text that follows
/// - the word `feat.` (case sensitive) and the text that follows
///
/// then trims the result. Applying it twice yields the same string.
pub fn simplify(field: &str) -> String {
    let simplified = BRACKETS.replace(field, "");
    let simplified = SLASH.replace(&simplified, "");
    let simplified = HYPHEN_SPACE.replace(&simplified, "");
    let simplified = FEAT.replace(&simplified, "");

    simplified.trim().to_string()
}
