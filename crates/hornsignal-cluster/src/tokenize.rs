//! Token bag construction for lexical similarity.

use std::collections::HashMap;

/// Common English particles plus domain-noise tokens that would otherwise
/// dominate every article about this beat and defeat discrimination between
/// distinct stories.
const STOPWORDS: &[&str] = &[
    // common English particles
    "the", "and", "for", "are", "but", "not", "you", "all", "with", "his", "her", "its",
    "this", "that", "from", "have", "has", "had", "was", "were", "been", "will", "would",
    "could", "should", "can", "may", "might", "over", "into", "out", "about", "after",
    "before", "than", "then", "them", "their", "there", "what", "when", "where", "who",
    "how", "why", "which", "while", "also", "more", "most", "some", "such", "only", "own",
    "other", "each", "per",
    // domain-noise tokens specific to this beat
    "south", "sudan", "sudanese", "said", "says", "new",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lowercase, strip non-alphanumerics to spaces, split on whitespace, drop
/// tokens of length <= 2 and stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 2 && !is_stopword(t))
        .map(|t| t.to_string())
        .collect()
}

/// Per-article term frequency vector, keyed by token.
pub fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let tokens = tokenize(text);
    let mut tf: HashMap<String, f64> = HashMap::new();
    for token in tokens {
        *tf.entry(token).or_insert(0.0) += 1.0;
    }
    tf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_tokens_and_stopwords() {
        let tokens = tokenize("The new Sudan war in Juba and Bor");
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"new".to_string()));
        assert!(!tokens.contains(&"sudan".to_string()));
        assert!(!tokens.contains(&"and".to_string()));
        assert!(tokens.contains(&"juba".to_string()));
        assert!(tokens.contains(&"bor".to_string()));
    }

    #[test]
    fn keeps_three_letter_non_stopwords() {
        let tokens = tokenize("war erupts");
        assert!(tokens.contains(&"war".to_string()));
    }
}
