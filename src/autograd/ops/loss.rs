//! Fused loss operations: masked cross-entropy and Gaussian KL divergence

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Mean token cross-entropy over `(n, vocab)` logits
///
/// Rows whose target equals `ignore_index` contribute neither loss nor
/// gradient. Returns `(1, 1)`; zero when every row is ignored.
pub fn cross_entropy(logits: &Tensor, targets: &[usize], ignore_index: Option<usize>) -> Tensor {
    let (n, vocab) = logits.shape();
    assert_eq!(targets.len(), n, "cross_entropy: one target per logit row required");

    let mut grad = Array1::zeros(n * vocab);
    let mut total = 0.0f32;
    let mut counted = 0usize;

    for (row, &target) in targets.iter().enumerate() {
        if Some(target) == ignore_index {
            continue;
        }
        assert!(target < vocab, "cross_entropy: target {target} outside vocabulary of {vocab}");
        let offset = row * vocab;
        let slice = &logits.data().as_slice().expect("logits must be contiguous")[offset..offset + vocab];
        let max = slice.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let sum_exp: f32 = slice.iter().map(|v| (v - max).exp()).sum();
        let log_z = max + sum_exp.ln();
        total += log_z - slice[target];
        for (c, v) in slice.iter().enumerate() {
            grad[offset + c] = (v - log_z).exp();
        }
        grad[offset + target] -= 1.0;
        counted += 1;
    }

    let denom = counted.max(1) as f32;
    let data = Array1::from(vec![total / denom]);
    let mut loss = Tensor::op_result(data, 1, 1, logits.requires_grad());

    if loss.requires_grad() {
        grad.mapv_inplace(|g| g / denom);
        loss.set_backward_op(Rc::new(PrecomputedBackward {
            inputs: vec![(logits.clone(), grad)],
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

/// KL(N(mu, exp(logvar)) || N(0, I)) summed over latent dims, averaged over rows
///
/// `-0.5 * Σ (1 + logvar - mu² - exp(logvar))`; returns `(1, 1)`.
pub fn gaussian_kl(mu: &Tensor, logvar: &Tensor) -> Tensor {
    assert_eq!(mu.shape(), logvar.shape(), "gaussian_kl: mu and logvar shapes differ");
    let batch = mu.rows().max(1) as f32;

    let kl: f32 = mu
        .data()
        .iter()
        .zip(logvar.data().iter())
        .map(|(&m, &lv)| -0.5 * (1.0 + lv - m * m - lv.exp()))
        .sum::<f32>()
        / batch;

    let requires_grad = mu.requires_grad() || logvar.requires_grad();
    let mut loss = Tensor::op_result(Array1::from(vec![kl]), 1, 1, requires_grad);

    if loss.requires_grad() {
        // ∂KL/∂mu = mu / B, ∂KL/∂logvar = 0.5 (exp(logvar) - 1) / B
        let grad_mu = mu.data().mapv(|m| m / batch);
        let grad_logvar = logvar.data().mapv(|lv| 0.5 * (lv.exp() - 1.0) / batch);
        loss.set_backward_op(Rc::new(PrecomputedBackward {
            inputs: vec![(mu.clone(), grad_mu), (logvar.clone(), grad_logvar)],
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

/// Backward for scalar-valued fused ops whose local gradients are known at
/// forward time; scaled by the incoming scalar gradient.
struct PrecomputedBackward {
    inputs: Vec<(Tensor, Array1<f32>)>,
    result_grad: GradCell,
}

impl BackwardOp for PrecomputedBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let upstream = grad[0];
            for (input, local) in &self.inputs {
                if input.requires_grad() {
                    input.accumulate_grad(local * upstream);
                }
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.inputs.iter().map(|(t, _)| t.clone()).collect()
    }
}
