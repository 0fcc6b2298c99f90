//! Line-per-sentence corpora split into train / valid / test

use super::vocab::Vocab;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// How raw lines become sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// Every non-blank line is one sentence
    Plain,
    /// WikiText: section headings (`= Title =`) are skipped
    WikiText,
}

/// The three files making up a corpus
#[derive(Debug, Clone)]
pub struct CorpusFiles {
    pub train: PathBuf,
    pub valid: PathBuf,
    pub test: PathBuf,
    pub format: LineFormat,
}

impl CorpusFiles {
    /// `<prefix>.train<suffix>`, `<prefix>.valid<suffix>`, `<prefix>.test<suffix>` under `dir`
    pub fn in_dir(dir: impl AsRef<Path>, prefix: &str, suffix: &str, format: LineFormat) -> Self {
        let dir = dir.as_ref();
        Self {
            train: dir.join(format!("{prefix}.train{suffix}")),
            valid: dir.join(format!("{prefix}.valid{suffix}")),
            test: dir.join(format!("{prefix}.test{suffix}")),
            format,
        }
    }
}

/// Tokenized and id-mapped sentences for every split
#[derive(Debug, Clone)]
pub struct Corpus {
    pub vocab: Vocab,
    pub train: Vec<Vec<usize>>,
    pub valid: Vec<Vec<usize>>,
    pub test: Vec<Vec<usize>>,
}

impl Corpus {
    /// Build from tokenized splits; the vocabulary comes from `train` only
    pub fn from_tokens(
        train: &[Vec<String>],
        valid: &[Vec<String>],
        test: &[Vec<String>],
        min_freq: usize,
    ) -> Self {
        let vocab = Vocab::build(train.iter().map(Vec::as_slice), min_freq);
        let encode = |split: &[Vec<String>]| split.iter().map(|s| vocab.encode(s)).collect();
        Self {
            train: encode(train),
            valid: encode(valid),
            test: encode(test),
            vocab,
        }
    }

    /// Read and encode all three files
    pub fn load(files: &CorpusFiles, min_freq: usize) -> Result<Self> {
        let train = read_sentences(&files.train, files.format)?;
        if train.is_empty() {
            return Err(Error::Data(format!(
                "training file {} contains no sentences",
                files.train.display()
            )));
        }
        let valid = read_sentences(&files.valid, files.format)?;
        let test = read_sentences(&files.test, files.format)?;
        Ok(Self::from_tokens(&train, &valid, &test, min_freq))
    }
}

/// Whitespace-tokenize a file into sentences
pub fn read_sentences(path: &Path, format: LineFormat) -> Result<Vec<Vec<String>>> {
    let file = File::open(path)
        .map_err(|e| Error::Data(format!("cannot open {}: {e}", path.display())))?;
    let mut sentences = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if format == LineFormat::WikiText && is_heading(trimmed) {
            continue;
        }
        sentences.push(trimmed.split_whitespace().map(str::to_string).collect());
    }
    Ok(sentences)
}

fn is_heading(line: &str) -> bool {
    line.len() > 1 && line.starts_with('=') && line.ends_with('=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut f = File::create(dir.join(name)).expect("create should succeed");
        f.write_all(content.as_bytes()).expect("write should succeed");
    }

    #[test]
    fn test_read_sentences_skips_blank_lines() {
        let dir = TempDir::new().expect("tempdir should succeed");
        write(dir.path(), "a.txt", " the cat \n\n sat down \n");
        let s = read_sentences(&dir.path().join("a.txt"), LineFormat::Plain).expect("read should succeed");
        assert_eq!(s, vec![vec!["the", "cat"], vec!["sat", "down"]]);
    }

    #[test]
    fn test_wikitext_headings_are_dropped() {
        let dir = TempDir::new().expect("tempdir should succeed");
        write(dir.path(), "w.tokens", " = Title = \n a b \n = = Sub = = \n c\n");
        let s = read_sentences(&dir.path().join("w.tokens"), LineFormat::WikiText).expect("read should succeed");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_load_builds_vocab_from_train_only() {
        let dir = TempDir::new().expect("tempdir should succeed");
        write(dir.path(), "ptb.train.txt", "a b\nb c\n");
        write(dir.path(), "ptb.valid.txt", "a z\n");
        write(dir.path(), "ptb.test.txt", "c\n");
        let files = CorpusFiles::in_dir(dir.path(), "ptb", ".txt", LineFormat::Plain);
        let corpus = Corpus::load(&files, 1).expect("load should succeed");
        assert_eq!(corpus.vocab.len(), 7);
        assert_eq!(corpus.valid[0][1], corpus.vocab.specials().unk);
        assert_eq!(corpus.train.len(), 2);
    }

    #[test]
    fn test_missing_file_is_data_error() {
        let dir = TempDir::new().expect("tempdir should succeed");
        let files = CorpusFiles::in_dir(dir.path(), "ptb", ".txt", LineFormat::Plain);
        assert!(matches!(Corpus::load(&files, 1), Err(Error::Data(_))));
    }
}
