//! Dropout variants used by the recurrent model
//!
//! All of them are identities outside training mode or at rate 0, and all draw
//! their randomness from the [`Context`] so a seeded run is reproducible.

use crate::autograd::{mul, Context};
use crate::data::SpecialTokens;
use crate::Tensor;
use ndarray::Array2;

/// One `(rows × cols)` mask reused for every time step
///
/// Dropping the same units at every step keeps the recurrent signal
/// consistent across the sequence.
pub struct LockedDropout {
    mask: Option<Tensor>,
}

impl LockedDropout {
    /// Draw a mask for activations of shape `(rows × cols)`
    pub fn sample(ctx: &mut Context, rows: usize, cols: usize, p: f32) -> Self {
        if !ctx.is_training() || p == 0.0 {
            return Self { mask: None };
        }
        let mask = Tensor::from_matrix(ctx.dropout_mask(rows * cols, p), rows, cols, false);
        Self { mask: Some(mask) }
    }

    /// Apply the mask (identity when none was drawn)
    pub fn apply(&self, x: &Tensor) -> Tensor {
        match &self.mask {
            Some(mask) => mul(x, mask),
            None => x.clone(),
        }
    }
}

/// Per-word scale removing whole rows of the embedding matrix
///
/// Returns `None` when nothing is dropped.
pub fn embedding_row_scale(ctx: &mut Context, vocab_size: usize, p: f32) -> Option<Vec<f32>> {
    if !ctx.is_training() || p == 0.0 {
        return None;
    }
    Some(ctx.dropout_mask(vocab_size, p))
}

/// DropConnect on a weight matrix; a fresh mask per call while training
pub fn weight_drop(ctx: &mut Context, weight: &Tensor, p: f32) -> Tensor {
    if !ctx.is_training() || p == 0.0 {
        return weight.clone();
    }
    let (rows, cols) = weight.shape();
    let mask = Tensor::from_matrix(ctx.dropout_mask(rows * cols, p), rows, cols, false);
    mul(weight, &mask)
}

/// Replace decoder input words with `<unk>`, keeping each with `keep_rate`
///
/// Row 0 (`<bos>`) and `<pad>` positions are never replaced.
pub fn word_dropout(
    ctx: &mut Context,
    input: &Array2<usize>,
    keep_rate: f32,
    specials: SpecialTokens,
) -> Array2<usize> {
    let mut dropped = input.clone();
    if !ctx.is_training() || keep_rate >= 1.0 {
        return dropped;
    }
    for ((t, _), id) in dropped.indexed_iter_mut() {
        if t == 0 || *id == specials.pad {
            continue;
        }
        if !ctx.bernoulli(keep_rate) {
            *id = specials.unk;
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpecialTokens;
    use proptest::prelude::*;

    #[test]
    fn test_locked_mask_is_shared_across_steps() {
        let mut ctx = Context::new(4);
        let locked = LockedDropout::sample(&mut ctx, 2, 8, 0.5);
        let a = locked.apply(&Tensor::from_matrix(vec![1.0; 16], 2, 8, false));
        let b = locked.apply(&Tensor::from_matrix(vec![1.0; 16], 2, 8, false));
        assert_eq!(a.data(), b.data());
        assert!(a.data().iter().all(|v| *v == 0.0 || *v == 2.0));
    }

    #[test]
    fn test_dropouts_are_identity_in_eval() {
        let mut ctx = Context::new(0);
        ctx.eval();
        let w = Tensor::from_matrix(vec![1.0, 2.0, 3.0, 4.0], 2, 2, true);
        assert_eq!(weight_drop(&mut ctx, &w, 0.9).data(), w.data());
        assert_eq!(LockedDropout::sample(&mut ctx, 2, 2, 0.9).apply(&w).data(), w.data());
        assert!(embedding_row_scale(&mut ctx, 10, 0.9).is_none());
        let ids = Array2::from_elem((3, 2), 7);
        assert_eq!(word_dropout(&mut ctx, &ids, 0.0001, SpecialTokens::default()), ids);
    }

    #[test]
    fn test_weight_drop_draws_new_mask_each_call() {
        let mut ctx = Context::new(11);
        let w = Tensor::from_matrix(vec![1.0; 64], 8, 8, false);
        let a = weight_drop(&mut ctx, &w, 0.5);
        let b = weight_drop(&mut ctx, &w, 0.5);
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_word_dropout_keep_everything() {
        let mut ctx = Context::new(0);
        let ids = Array2::from_shape_vec((2, 2), vec![2, 2, 9, 0]).unwrap();
        assert_eq!(word_dropout(&mut ctx, &ids, 1.0, SpecialTokens::default()), ids);
    }

    proptest! {
        #[test]
        fn prop_word_dropout_spares_bos_and_pad(
            seed in any::<u64>(),
            keep in 0.0f32..1.0,
            rows in 1usize..8,
            cols in 1usize..6,
        ) {
            let specials = SpecialTokens::default();
            let mut ids = Array2::from_elem((rows, cols), 10usize);
            ids.row_mut(0).fill(specials.bos);
            if rows > 1 {
                ids[[rows - 1, 0]] = specials.pad;
            }
            let mut ctx = Context::new(seed);
            let dropped = word_dropout(&mut ctx, &ids, keep, specials);
            for ((t, b), &id) in dropped.indexed_iter() {
                let original = ids[[t, b]];
                if t == 0 || original == specials.pad {
                    prop_assert_eq!(id, original);
                } else {
                    prop_assert!(id == original || id == specials.unk);
                }
            }
        }
    }
}
