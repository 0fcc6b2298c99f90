//! Corpora, vocabulary and batch sources

mod corpus;
mod registry;
mod source;
mod vocab;

pub use corpus::{read_sentences, Corpus, CorpusFiles, LineFormat};
pub use registry::{DataOptions, DatasetRegistry, SourceFactory};
pub use source::{BatchSource, InMemorySource, Split};
pub use vocab::{SpecialTokens, Vocab, BOS_TOKEN, EOS_TOKEN, PAD_TOKEN, UNK_TOKEN};
