//! Whitespace tokenizer for book text

/// Split text into words on runs of whitespace.
///
/// Order and content are preserved as-is: no case folding and no punctuation
/// stripping. Empty or whitespace-only text yields no words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        let words = tokenize("  the quick\tbrown\n\n fox  ");
        assert_eq!(words, vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn keeps_punctuation_and_case() {
        let words = tokenize("Hello, World! It's");
        assert_eq!(words, vec!["Hello,", "World!", "It's"]);
    }

    #[test]
    fn empty_and_blank_text_have_no_words() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }
}
