//! Token ↔ id mapping with reserved special tokens

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Padding token (id 0)
pub const PAD_TOKEN: &str = "<pad>";
/// Unknown / word-dropout placeholder (id 1)
pub const UNK_TOKEN: &str = "<unk>";
/// Start-of-sentence marker (id 2)
pub const BOS_TOKEN: &str = "<bos>";
/// End-of-sentence marker (id 3)
pub const EOS_TOKEN: &str = "<eos>";

/// Ids of the reserved tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub pad: usize,
    pub unk: usize,
    pub bos: usize,
    pub eos: usize,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: 0,
            unk: 1,
            bos: 2,
            eos: 3,
        }
    }
}

/// Vocabulary
///
/// Ids `0..4` are always `<pad> <unk> <bos> <eos>`. Corpus words follow in
/// descending frequency, ties broken alphabetically, so building twice from
/// the same corpus yields the same ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocab {
    itos: Vec<String>,
    stoi: HashMap<String, usize>,
}

impl Vocab {
    /// Vocabulary holding only the special tokens
    pub fn new() -> Self {
        let mut vocab = Self {
            itos: Vec::new(),
            stoi: HashMap::new(),
        };
        for token in [PAD_TOKEN, UNK_TOKEN, BOS_TOKEN, EOS_TOKEN] {
            vocab.add_token(token);
        }
        vocab
    }

    /// Build from tokenized sentences, keeping words seen at least `min_freq` times
    pub fn build<'a, I>(sentences: I, min_freq: usize) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for sentence in sentences {
            for word in sentence {
                *counts.entry(word.as_str()).or_default() += 1;
            }
        }

        let mut words: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|(_, c)| *c >= min_freq.max(1))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut vocab = Self::new();
        for (word, _) in words {
            vocab.add_token(word);
        }
        vocab
    }

    /// Insert a token if absent and return its id
    pub fn add_token(&mut self, token: &str) -> usize {
        if let Some(&id) = self.stoi.get(token) {
            return id;
        }
        let id = self.itos.len();
        self.itos.push(token.to_string());
        self.stoi.insert(token.to_string(), id);
        id
    }

    /// Id of `token`, or the `<unk>` id
    pub fn id(&self, token: &str) -> usize {
        self.stoi.get(token).copied().unwrap_or(self.specials().unk)
    }

    /// Token for `id`
    pub fn token(&self, id: usize) -> Option<&str> {
        self.itos.get(id).map(String::as_str)
    }

    /// Number of entries including special tokens
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// Never true in practice: special tokens are always present
    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    /// Reserved ids
    pub fn specials(&self) -> SpecialTokens {
        SpecialTokens::default()
    }

    /// Map words to ids
    pub fn encode(&self, words: &[String]) -> Vec<usize> {
        words.iter().map(|w| self.id(w)).collect()
    }

    /// Map ids back to tokens (`<unk>` for unknown ids)
    pub fn decode(&self, ids: &[usize]) -> Vec<&str> {
        ids.iter().map(|&id| self.token(id).unwrap_or(UNK_TOKEN)).collect()
    }
}

impl Default for Vocab {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for Vocab {
    fn from(tokens: Vec<String>) -> Self {
        let mut vocab = Self::new();
        for token in &tokens {
            vocab.add_token(token);
        }
        vocab
    }
}

impl From<Vocab> for Vec<String> {
    fn from(vocab: Vocab) -> Self {
        vocab.itos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_specials_are_reserved() {
        let vocab = Vocab::new();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.id(PAD_TOKEN), 0);
        assert_eq!(vocab.id(UNK_TOKEN), 1);
        assert_eq!(vocab.id(BOS_TOKEN), 2);
        assert_eq!(vocab.id(EOS_TOKEN), 3);
    }

    #[test]
    fn test_build_orders_by_frequency_then_alphabet() {
        let data = sentences(&["b a a", "c b a"]);
        let vocab = Vocab::build(data.iter().map(Vec::as_slice), 1);
        assert_eq!(vocab.token(4), Some("a"));
        assert_eq!(vocab.token(5), Some("b"));
        assert_eq!(vocab.token(6), Some("c"));
    }

    #[test]
    fn test_min_freq_maps_rare_words_to_unk() {
        let data = sentences(&["x y y"]);
        let vocab = Vocab::build(data.iter().map(Vec::as_slice), 2);
        assert_eq!(vocab.id("x"), vocab.specials().unk);
        assert_ne!(vocab.id("y"), vocab.specials().unk);
    }

    #[test]
    fn test_serde_preserves_ids() {
        let data = sentences(&["the cat sat"]);
        let vocab = Vocab::build(data.iter().map(Vec::as_slice), 1);
        let json = serde_json::to_string(&vocab).unwrap();
        let back: Vocab = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
        assert_eq!(back.decode(&[2, vocab.id("cat"), 3]), vec![BOS_TOKEN, "cat", EOS_TOKEN]);
    }
}
