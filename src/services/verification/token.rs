//! Memorable verification tokens.

use petname::{Generator, Petnames};

/// Words per token.
const TOKEN_WORDS: u8 = 3;

/// Produces the token emailed to a user.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Three dash-joined words from the petname lists (e.g. `gladly-brave-otter`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Petname;

impl TokenGenerator for Petname {
    fn generate(&self) -> String {
        Petnames::default()
            .generate_one(TOKEN_WORDS, "-")
            // `None` only for empty word lists.
            .unwrap_or_else(|| format!("{:016x}", rand::random::<u64>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_three_lowercase_words() {
        for _ in 0..50 {
            let token = Petname.generate();
            let words: Vec<&str> = token.split('-').collect();
            assert_eq!(words.len(), 3, "token {token}");
            for word in words {
                assert!(!word.is_empty(), "token {token}");
                assert!(word.chars().all(|c| c.is_ascii_lowercase()), "token {token}");
            }
        }
    }

    #[test]
    fn test_single_whitespace_free_word() {
        // Users echo the token back as the first whitespace-delimited word.
        let token = Petname.generate();
        assert_eq!(token.split_whitespace().count(), 1);
    }

    #[test]
    fn test_tokens_rarely_repeat() {
        let tokens: HashSet<String> = (0..200).map(|_| Petname.generate()).collect();
        assert!(tokens.len() >= 195, "only {} distinct tokens", tokens.len());
    }
}
