//! Embedding lookup with optional per-word scaling

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Gather rows of a `(vocab, dim)` table
///
/// `row_scale`, when present, multiplies each looked-up row by the factor for
/// its word id. Dropping entire words from the embedding matrix is expressed as
/// a scale of 0 for dropped ids and `1 / (1 - p)` for the rest.
///
/// # Panics
///
/// Panics if an id is outside the table; callers validate ids first.
pub fn embedding(table: &Tensor, ids: &[usize], row_scale: Option<&[f32]>) -> Tensor {
    let (vocab, dim) = table.shape();
    if let Some(scale) = row_scale {
        assert_eq!(scale.len(), vocab, "embedding: row_scale must have one entry per word");
    }
    let mut data = Vec::with_capacity(ids.len() * dim);
    for &id in ids {
        assert!(id < vocab, "embedding: id {id} outside vocabulary of {vocab}");
        let factor = row_scale.map_or(1.0, |s| s[id]);
        data.extend(table.data().iter().skip(id * dim).take(dim).map(|v| v * factor));
    }
    let mut result = Tensor::op_result(Array1::from(data), ids.len(), dim, table.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(EmbeddingBackward {
            table: table.clone(),
            ids: ids.to_vec(),
            row_scale: row_scale.map(<[f32]>::to_vec),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct EmbeddingBackward {
    table: Tensor,
    ids: Vec<usize>,
    row_scale: Option<Vec<f32>>,
    result_grad: GradCell,
}

impl BackwardOp for EmbeddingBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.table.requires_grad() {
                let dim = self.table.cols();
                let mut grad_table = Array1::zeros(self.table.len());
                for (i, &id) in self.ids.iter().enumerate() {
                    let factor = self.row_scale.as_ref().map_or(1.0, |s| s[id]);
                    if factor == 0.0 {
                        continue;
                    }
                    for c in 0..dim {
                        grad_table[id * dim + c] += grad[i * dim + c] * factor;
                    }
                }
                self.table.accumulate_grad(grad_table);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.table.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};

    #[test]
    fn test_embedding_lookup() {
        let table = Tensor::from_matrix(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0], 3, 2, false);
        let e = embedding(&table, &[2, 0, 2], None);
        assert_eq!(e.shape(), (3, 2));
        assert_eq!(e.data().to_vec(), vec![2.0, 2.0, 0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_embedding_backward_accumulates_repeated_ids() {
        let table = Tensor::from_matrix(vec![1.0; 6], 3, 2, true);
        let mut s = sum(&embedding(&table, &[1, 1, 2], Some(&[1.0, 2.0, 0.0])));
        backward(&mut s, None);
        assert_eq!(table.grad().unwrap().to_vec(), vec![0.0, 0.0, 4.0, 4.0, 0.0, 0.0]);
    }
}
