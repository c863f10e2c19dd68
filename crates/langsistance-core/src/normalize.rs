//! Answer normalization.
//!
//! The normalized form is only ever compared, never displayed.

/// Characters removed from answers before comparison.
const STRIPPED: [char; 4] = ['.', ',', '!', '?'];

/// Canonicalize an answer for equality comparison.
///
/// Lowercases the text, removes `. , ! ?`, collapses every whitespace run
/// to a single space and trims both ends. Punctuation is removed before
/// whitespace is collapsed so that `normalize(normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use langsistance_core::normalize;
///
/// assert_eq!(normalize("  Hello,   World!! "), "hello world");
/// assert_eq!(normalize("Hello, World!!"), normalize("hello world"));
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_punctuation_and_whitespace_insensitive() {
        assert_eq!(normalize("Hello, World!!"), normalize("hello world"));
        assert_eq!(normalize("Is it?  Yes."), "is it yes");
        assert_eq!(normalize("\tTabs\nand\r\nnewlines "), "tabs and newlines");
    }

    #[test]
    fn keeps_other_punctuation() {
        assert_eq!(normalize("2+2 = 4; done:"), "2+2 = 4; done:");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t"), "");
        assert_eq!(normalize("?!.,"), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Hello, World!!",
            "a . b",
            "  spaced ,  out  ",
            "Ünïcödé TEXT!",
            "line one.\nline two?",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn punctuation_between_spaces_collapses() {
        assert_eq!(normalize("a . b"), "a b");
    }
}
