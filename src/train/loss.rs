//! RVAE objective
//!
//! `total = reconstruction + anneal · min(KL, max_kl_penalty) + AR + TAR`

use super::Batch;
use crate::autograd::{add, clamp_max, cross_entropy, mul, scale, stack_rows, sub, sum};
use crate::config::TrainingConfig;
use crate::model::RvaeOutput;
use crate::Tensor;

/// Loss terms for one batch
pub struct LossBreakdown {
    /// Differentiable objective
    pub total: Tensor,
    /// Mean token cross-entropy over non-padding targets
    pub reconstruction: f32,
    /// Unclamped, unweighted KL
    pub kl: f32,
    pub ar: f32,
    pub tar: f32,
}

impl LossBreakdown {
    pub fn total_value(&self) -> f32 {
        self.total.item()
    }

    /// `exp(reconstruction)`
    pub fn perplexity(&self) -> f32 {
        self.reconstruction.exp()
    }
}

/// Combines reconstruction, KL and activation regularisers
#[derive(Debug, Clone, Copy)]
pub struct RvaeLoss {
    pub alpha: f32,
    pub beta: f32,
    /// Ceiling on the KL term; `0` means no ceiling
    pub max_kl_penalty: f32,
    pub pad: usize,
}

impl RvaeLoss {
    pub fn new(alpha: f32, beta: f32, max_kl_penalty: f32, pad: usize) -> Self {
        Self {
            alpha,
            beta,
            max_kl_penalty,
            pad,
        }
    }

    pub fn from_config(config: &TrainingConfig, pad: usize) -> Self {
        Self::new(config.alpha, config.beta, config.max_kl_penalty, pad)
    }

    /// Assemble the objective with KL weight `anneal`
    pub fn compute(&self, output: &RvaeOutput, batch: &Batch, anneal: f32) -> LossBreakdown {
        let nll = cross_entropy(&output.logits, &batch.target_flat(), Some(self.pad));
        let kl = output.posterior.kl();
        let kl_term = if self.max_kl_penalty > 0.0 {
            clamp_max(&kl, self.max_kl_penalty)
        } else {
            kl.clone()
        };
        let mut total = add(&nll, &scale(&kl_term, anneal));

        let mut ar_value = 0.0;
        if self.alpha != 0.0 && !output.dropped_outputs.is_empty() {
            let steps: Vec<usize> = (0..output.dropped_outputs.len()).collect();
            if let Some(ar) = masked_mean_square(&output.dropped_outputs, &steps, batch) {
                let ar = scale(&ar, self.alpha);
                ar_value = ar.item();
                total = add(&total, &ar);
            }
        }

        let mut tar_value = 0.0;
        if self.beta != 0.0 && output.raw_outputs.len() > 1 {
            let raw = &output.raw_outputs;
            let diffs: Vec<Tensor> = raw.windows(2).map(|w| sub(&w[1], &w[0])).collect();
            let steps: Vec<usize> = (1..raw.len()).collect();
            if let Some(tar) = masked_mean_square(&diffs, &steps, batch) {
                let tar = scale(&tar, self.beta);
                tar_value = tar.item();
                total = add(&total, &tar);
            }
        }

        LossBreakdown {
            reconstruction: nll.item(),
            kl: kl.item(),
            ar: ar_value,
            tar: tar_value,
            total,
        }
    }
}

/// Mean of `x²` over the rows of `rows` whose sentence is still running
///
/// `rows[i]` is a `(batch × nhid)` activation for time step `steps[i]`.
/// Returns `None` when no row is active.
fn masked_mean_square(rows: &[Tensor], steps: &[usize], batch: &Batch) -> Option<Tensor> {
    let width = rows.first()?.cols();
    let mut mask = Vec::with_capacity(rows.len() * batch.batch_size() * width);
    let mut active_rows = 0usize;
    for &t in steps {
        for active in batch.active(t) {
            active_rows += usize::from(active);
            mask.extend(std::iter::repeat(if active { 1.0 } else { 0.0 }).take(width));
        }
    }
    if active_rows == 0 {
        return None;
    }
    let stacked = stack_rows(rows);
    let mask = Tensor::from_matrix(mask, stacked.rows(), width, false);
    let masked = mul(&mul(&stacked, &stacked), &mask);
    Some(scale(&sum(&masked), 1.0 / (active_rows * width) as f32))
}
