//! Generic-intent detection for joke requests.

/// Lowercase fragments that mark a request as "any joke will do". Matched as substrings,
/// so a topic like "chips" (contains "hi") is also treated as generic.
pub const GENERIC_KEYWORDS: &[&str] = &[
    "random",
    "any",
    "surprise",
    "dad joke",
    "make me laugh",
    "joke please",
    "hi",
    "hello",
    "hey",
];

/// Requests that are generic only when they are the whole message; "tell me a joke about
/// cats" names a topic.
const GENERIC_PHRASES: &[&str] = &["tell me a joke", "give me a joke"];

/// True when the text is blank, is one of the bare joke phrases, or contains a generic
/// keyword (case-insensitive substring).
pub fn is_generic_request(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    let bare = lower.trim_end_matches(|c: char| c.is_ascii_punctuation()).trim_end();
    GENERIC_PHRASES.contains(&bare) || GENERIC_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_generic() {
        assert!(is_generic_request(""));
        assert!(is_generic_request("   \t\n"));
    }

    #[test]
    fn greetings_and_phrases_are_generic() {
        assert!(is_generic_request("hello"));
        assert!(is_generic_request("HEY there"));
        assert!(is_generic_request("Make Me Laugh"));
        assert!(is_generic_request("random joke please"));
        assert!(is_generic_request("Tell me a dad joke"));
    }

    #[test]
    fn bare_joke_phrases_are_generic() {
        assert!(is_generic_request("Tell me a joke"));
        assert!(is_generic_request("give me a joke!"));
    }

    #[test]
    fn topic_request_is_not_generic() {
        assert!(!is_generic_request("Tell me a joke about cats"));
        assert!(!is_generic_request("Give me a joke about food"));
        assert!(!is_generic_request("cats"));
    }

    #[test]
    fn substring_match_is_kept() {
        // "chips" contains "hi", "company" contains "any"
        assert!(is_generic_request("chips"));
        assert!(is_generic_request("company"));
    }
}
