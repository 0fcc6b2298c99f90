//! Batch data structure

use crate::data::SpecialTokens;
use crate::error::{Error, Result};
use ndarray::Array2;

/// A `(seq_len × batch_size)` block of token ids with next-token targets
///
/// Column `b` holds one sentence: `input[0, b]` is `<bos>`, `target[t, b]` is
/// `input[t + 1, b]` for every valid step, the last valid target is `<eos>`,
/// and everything past `lengths[b]` is `<pad>` in both matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Decoder/encoder input ids
    pub input: Array2<usize>,
    /// Next-token ids
    pub target: Array2<usize>,
    /// Valid steps per column
    pub lengths: Vec<usize>,
}

impl Batch {
    /// Create a batch, checking that the matrices agree in shape
    pub fn new(input: Array2<usize>, target: Array2<usize>, lengths: Vec<usize>) -> Result<Self> {
        if input.dim() != target.dim() {
            return Err(Error::shape_mismatch(
                "batch target",
                format!("{:?}", input.dim()),
                format!("{:?}", target.dim()),
            ));
        }
        if lengths.len() != input.ncols() {
            return Err(Error::shape_mismatch(
                "batch lengths",
                input.ncols().to_string(),
                lengths.len().to_string(),
            ));
        }
        if let Some(&len) = lengths.iter().find(|&&l| l > input.nrows()) {
            return Err(Error::shape_mismatch(
                "batch column length",
                format!("<= {}", input.nrows()),
                len.to_string(),
            ));
        }
        Ok(Self {
            input,
            target,
            lengths,
        })
    }

    /// Build a batch from tokenized sentences (ids without markers)
    ///
    /// Sentences longer than `max_len` are truncated before `<eos>` is appended.
    pub fn from_sequences(sentences: &[Vec<usize>], specials: SpecialTokens, max_len: Option<usize>) -> Self {
        let framed: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| {
                let keep = max_len.map_or(s.len(), |m| s.len().min(m));
                let mut seq = Vec::with_capacity(keep + 2);
                seq.push(specials.bos);
                seq.extend_from_slice(&s[..keep]);
                seq.push(specials.eos);
                seq
            })
            .collect();

        let lengths: Vec<usize> = framed.iter().map(|s| s.len() - 1).collect();
        let seq_len = lengths.iter().copied().max().unwrap_or(0);
        let batch_size = framed.len();

        let mut input = Array2::from_elem((seq_len, batch_size), specials.pad);
        let mut target = Array2::from_elem((seq_len, batch_size), specials.pad);
        for (b, seq) in framed.iter().enumerate() {
            for t in 0..seq.len() - 1 {
                input[[t, b]] = seq[t];
                target[[t, b]] = seq[t + 1];
            }
        }

        Self {
            input,
            target,
            lengths,
        }
    }

    /// Number of time steps
    pub fn seq_len(&self) -> usize {
        self.input.nrows()
    }

    /// Number of sentences
    pub fn batch_size(&self) -> usize {
        self.input.ncols()
    }

    /// Number of non-padding target positions
    pub fn num_tokens(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Target ids flattened time-major (`t * batch + b`)
    pub fn target_flat(&self) -> Vec<usize> {
        self.target.iter().copied().collect()
    }

    /// Which columns are still inside their sentence at step `t`
    pub fn active(&self, t: usize) -> Vec<bool> {
        self.lengths.iter().map(|&len| t < len).collect()
    }

    /// Largest id appearing in input or target
    pub fn max_id(&self) -> Option<usize> {
        self.input.iter().chain(self.target.iter()).copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn specials() -> SpecialTokens {
        SpecialTokens::default()
    }

    #[test]
    fn test_batch_from_sequences_layout() {
        let batch = Batch::from_sequences(&[vec![10, 11, 12], vec![20]], specials(), None);
        assert_eq!(batch.seq_len(), 4);
        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.lengths, vec![4, 2]);
        assert_eq!(batch.input.column(0).to_vec(), vec![2, 10, 11, 12]);
        assert_eq!(batch.target.column(0).to_vec(), vec![10, 11, 12, 3]);
        assert_eq!(batch.input.column(1).to_vec(), vec![2, 20, 0, 0]);
        assert_eq!(batch.target.column(1).to_vec(), vec![20, 3, 0, 0]);
        assert_eq!(batch.num_tokens(), 6);
    }

    #[test]
    fn test_batch_truncates_to_max_len() {
        let batch = Batch::from_sequences(&[vec![5; 10]], specials(), Some(3));
        assert_eq!(batch.seq_len(), 4);
        assert_eq!(batch.target[[3, 0]], 3);
    }

    #[test]
    fn test_batch_empty_sentence_predicts_eos() {
        let batch = Batch::from_sequences(&[vec![]], specials(), None);
        assert_eq!(batch.input[[0, 0]], 2);
        assert_eq!(batch.target[[0, 0]], 3);
    }

    #[test]
    fn test_batch_flat_is_time_major() {
        let batch = Batch::from_sequences(&[vec![7], vec![8]], specials(), None);
        assert_eq!(batch.target_flat(), vec![7, 8, 3, 3]);
        assert_eq!(batch.active(1), vec![true, true]);
    }

    #[test]
    fn test_batch_new_rejects_mismatched_target() {
        let input = Array2::zeros((3, 2));
        let target = Array2::zeros((2, 2));
        assert!(matches!(
            Batch::new(input, target, vec![1, 1]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_target_is_input_shifted(
            sentences in prop::collection::vec(prop::collection::vec(4usize..50, 0..12), 1..6)
        ) {
            let batch = Batch::from_sequences(&sentences, specials(), None);
            for (b, &len) in batch.lengths.iter().enumerate() {
                prop_assert_eq!(batch.input[[0, b]], 2);
                for t in 0..len - 1 {
                    prop_assert_eq!(batch.target[[t, b]], batch.input[[t + 1, b]]);
                }
                prop_assert_eq!(batch.target[[len - 1, b]], 3);
                for t in len..batch.seq_len() {
                    prop_assert_eq!(batch.input[[t, b]], 0);
                    prop_assert_eq!(batch.target[[t, b]], 0);
                }
            }
        }
    }
}
