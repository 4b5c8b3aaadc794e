use std::collections::BTreeSet;

/// Splits a document on runs of whitespace. No case folding or punctuation
/// stripping is done, so `Now` and `now!` are distinct tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// The distinct tokens of a document. Repetition inside one document never
/// counts more than once, on either the training or the prediction side.
pub fn distinct_tokens(text: &str) -> BTreeSet<&str> {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_runs() {
        assert_eq!(tokenize("  buy\tnow \n  now "), vec!["buy", "now", "now"]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n").is_empty());
        assert!(distinct_tokens("   ").is_empty());
    }

    #[test]
    fn keeps_case_and_punctuation() {
        assert_eq!(tokenize("Now now! now"), vec!["Now", "now!", "now"]);
    }

    #[test]
    fn distinct_tokens_deduplicates() {
        let tokens = distinct_tokens("a b a c b a");
        assert_eq!(tokens.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn is_deterministic() {
        let text = "the quick  brown fox";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
