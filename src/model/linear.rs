//! Affine layer

use crate::autograd::{add_row, matmul_2d};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::Rng;

/// `len` values drawn uniformly from `[-bound, bound)`
pub(crate) fn uniform(rng: &mut StdRng, len: usize, bound: f32) -> Vec<f32> {
    (0..len).map(|_| rng.random_range(-bound..bound)).collect()
}

/// `y = x W + b` with `W: (in × out)` and `b: (1 × out)`
pub struct Linear {
    pub weight: Tensor,
    pub bias: Tensor,
}

impl Linear {
    /// Weights and bias from U(-1/√in, 1/√in)
    pub fn new(in_features: usize, out_features: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_features as f32).sqrt();
        Self {
            weight: Tensor::from_matrix(
                uniform(rng, in_features * out_features, bound),
                in_features,
                out_features,
                true,
            ),
            bias: Tensor::from_matrix(uniform(rng, out_features, bound), 1, out_features, true),
        }
    }

    pub fn in_features(&self) -> usize {
        self.weight.rows()
    }

    pub fn out_features(&self) -> usize {
        self.weight.cols()
    }

    /// `(rows × in) → (rows × out)`
    pub fn forward(&self, x: &Tensor) -> Tensor {
        add_row(&matmul_2d(x, &self.weight), &self.bias)
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}
