//! Named dataset factories

use super::corpus::{Corpus, CorpusFiles, LineFormat};
use super::source::{BatchSource, InMemorySource};
use crate::config::DataConfig;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Options every dataset factory receives
#[derive(Debug, Clone)]
pub struct DataOptions {
    /// Directory holding the split files
    pub data_dir: PathBuf,
    pub batch_size: usize,
    /// Maximum words kept per sentence
    pub max_len: usize,
    /// Words rarer than this map to `<unk>`
    pub min_freq: usize,
}

impl DataOptions {
    /// Options for the `data` section of a run configuration
    ///
    /// `bptt` bounds the sentence length.
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            batch_size: config.batch_size,
            max_len: config.bptt,
            min_freq: config.min_freq,
        }
    }
}

/// Builds a batch source from options
pub type SourceFactory = Box<dyn Fn(&DataOptions) -> Result<Box<dyn BatchSource>>>;

/// Registry mapping dataset names to factories
pub struct DatasetRegistry {
    factories: BTreeMap<String, SourceFactory>,
}

impl DatasetRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with `ptb` and `wt2`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("ptb", |opts| corpus_source("ptb", "ptb", ".txt", LineFormat::Plain, opts));
        registry.register("wt2", |opts| {
            corpus_source("wt2", "wiki", ".tokens", LineFormat::WikiText, opts)
        });
        registry
    }

    /// Add or replace a factory
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&DataOptions) -> Result<Box<dyn BatchSource>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the source registered under `name`
    pub fn create(&self, name: &str, opts: &DataOptions) -> Result<Box<dyn BatchSource>> {
        let factory = self.factories.get(name).ok_or_else(|| Error::UnknownDataset {
            name: name.to_string(),
            available: self.names().join(", "),
        })?;
        factory(opts)
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn corpus_source(
    name: &str,
    prefix: &str,
    suffix: &str,
    format: LineFormat,
    opts: &DataOptions,
) -> Result<Box<dyn BatchSource>> {
    let files = CorpusFiles::in_dir(&opts.data_dir, prefix, suffix, format);
    let corpus = Corpus::load(&files, opts.min_freq)?;
    Ok(Box::new(InMemorySource::new(name, corpus, opts.batch_size, opts.max_len)))
}
