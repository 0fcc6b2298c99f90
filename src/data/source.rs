//! Batched sequence sources

use super::corpus::Corpus;
use super::vocab::Vocab;
use crate::train::Batch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Sentences per length-sorting pool, in units of batches
const POOL_BATCHES: usize = 50;

/// Corpus split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Valid => write!(f, "valid"),
            Split::Test => write!(f, "test"),
        }
    }
}

/// Anything that can hand out `(seq_len × batch_size)` batches per split
pub trait BatchSource {
    /// Dataset name for logging
    fn name(&self) -> &str;

    /// Vocabulary shared by every split
    fn vocab(&self) -> &Vocab;

    /// Number of sentences in `split`
    fn num_sentences(&self, split: Split) -> usize;

    /// Batches for one pass over `split`
    ///
    /// With an RNG the sentences are shuffled and bucketed by length, so
    /// each epoch sees a different order. Without one the order is the file
    /// order, which evaluation relies on for reproducibility.
    fn batches(&self, split: Split, rng: Option<&mut StdRng>) -> Vec<Batch>;
}

/// A corpus held in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    corpus: Corpus,
    batch_size: usize,
    max_len: usize,
}

impl InMemorySource {
    /// Wrap a loaded corpus
    ///
    /// `max_len` caps the number of words kept per sentence.
    pub fn new(name: impl Into<String>, corpus: Corpus, batch_size: usize, max_len: usize) -> Self {
        Self {
            name: name.into(),
            corpus,
            batch_size: batch_size.max(1),
            max_len: max_len.max(1),
        }
    }

    /// Build directly from tokenized splits
    pub fn from_tokens(
        train: &[Vec<String>],
        valid: &[Vec<String>],
        test: &[Vec<String>],
        batch_size: usize,
        max_len: usize,
    ) -> Self {
        Self::new("memory", Corpus::from_tokens(train, valid, test, 1), batch_size, max_len)
    }

    /// Sentences per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn split(&self, split: Split) -> &[Vec<usize>] {
        match split {
            Split::Train => &self.corpus.train,
            Split::Valid => &self.corpus.valid,
            Split::Test => &self.corpus.test,
        }
    }
}

impl BatchSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocab(&self) -> &Vocab {
        &self.corpus.vocab
    }

    fn num_sentences(&self, split: Split) -> usize {
        self.split(split).len()
    }

    fn batches(&self, split: Split, rng: Option<&mut StdRng>) -> Vec<Batch> {
        let sentences = self.split(split);
        let specials = self.corpus.vocab.specials();
        let make = |idx: &[usize]| {
            let group: Vec<Vec<usize>> = idx.iter().map(|&i| sentences[i].clone()).collect();
            Batch::from_sequences(&group, specials, Some(self.max_len))
        };

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        match rng {
            None => order.chunks(self.batch_size).map(&make).collect(),
            Some(rng) => {
                order.shuffle(rng);
                let mut batches: Vec<Batch> = order
                    .chunks_mut(self.batch_size * POOL_BATCHES)
                    .flat_map(|pool| {
                        pool.sort_by_key(|&i| sentences[i].len());
                        pool.chunks(self.batch_size).map(&make).collect::<Vec<_>>()
                    })
                    .collect();
                batches.shuffle(rng);
                batches
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn tokens(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| (0..=i % 5).map(|j| format!("w{j}")).collect())
            .collect()
    }

    #[test]
    fn test_eval_batches_keep_file_order() {
        let data = tokens(7);
        let source = InMemorySource::from_tokens(&data, &data, &data, 3, 10);
        let batches = source.batches(Split::Valid, None);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].batch_size(), 1);
        assert_eq!(batches[0].lengths, vec![2, 3, 4]);
    }

    #[test]
    fn test_train_batches_cover_every_sentence_once() {
        let data = tokens(23);
        let source = InMemorySource::from_tokens(&data, &data, &data, 4, 10);
        let mut rng = StdRng::seed_from_u64(3);
        let batches = source.batches(Split::Train, Some(&mut rng));
        let total: usize = batches.iter().map(Batch::batch_size).sum();
        assert_eq!(total, 23);
        let tokens: usize = batches.iter().map(Batch::num_tokens).sum();
        let expected: usize = data.iter().map(|s| s.len() + 1).sum();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let data = tokens(30);
        let source = InMemorySource::from_tokens(&data, &data, &data, 4, 10);
        let a = source.batches(Split::Train, Some(&mut StdRng::seed_from_u64(9)));
        let b = source.batches(Split::Train, Some(&mut StdRng::seed_from_u64(9)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_len_truncates() {
        let data = vec![vec!["a".to_string(); 20]];
        let source = InMemorySource::from_tokens(&data, &data, &data, 1, 5);
        let batch = &source.batches(Split::Test, None)[0];
        assert_eq!(batch.seq_len(), 6);
    }
}
