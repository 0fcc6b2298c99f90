//! Shared word embedding lookup with embedding and input dropout

use super::dropout::{embedding_row_scale, LockedDropout};
use crate::autograd::{embedding, Context};
use crate::Tensor;
use ndarray::Array2;

/// Embed a `(seq_len × batch)` id matrix into one `(batch × dim)` tensor per step
///
/// `dropoute` removes whole words from `table` for this call; `dropouti`
/// masks the embedded inputs with one mask shared by every step.
pub fn embed_steps(
    table: &Tensor,
    ids: &Array2<usize>,
    dropoute: f32,
    dropouti: f32,
    ctx: &mut Context,
) -> Vec<Tensor> {
    let (vocab, dim) = table.shape();
    let batch = ids.ncols();
    let row_scale = embedding_row_scale(ctx, vocab, dropoute);
    let locked = LockedDropout::sample(ctx, batch, dim, dropouti);

    ids.rows()
        .into_iter()
        .map(|row| {
            let step: Vec<usize> = row.to_vec();
            locked.apply(&embedding(table, &step, row_scale.as_deref()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_steps_time_major() {
        let table = Tensor::from_matrix(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0], 3, 2, false);
        let ids = Array2::from_shape_vec((2, 2), vec![1, 2, 0, 1]).unwrap();
        let mut ctx = Context::new(0);
        ctx.eval();
        let steps = embed_steps(&table, &ids, 0.5, 0.5, &mut ctx);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].data().to_vec(), vec![1.0, 1.0, 2.0, 2.0]);
        assert_eq!(steps[1].data().to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_dropped_word_is_zero_everywhere() {
        let table = Tensor::from_matrix(vec![1.0; 40], 20, 2, false);
        let ids = Array2::from_shape_vec((3, 1), vec![5, 5, 5]).unwrap();
        let mut ctx = Context::new(8);
        let steps = embed_steps(&table, &ids, 0.5, 0.0, &mut ctx);
        let first = steps[0].data().to_vec();
        for s in &steps {
            assert_eq!(s.data().to_vec(), first);
        }
    }
}
