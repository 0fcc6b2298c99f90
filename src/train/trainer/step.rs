//! Training step operations

use super::core::RvaeTrainer;
use crate::autograd::backward;
use crate::error::{Error, Result};
use crate::optim::clip_grad_norm;
use crate::train::Batch;

/// Scalars reported by one optimizer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub loss: f32,
    pub reconstruction: f32,
    pub kl: f32,
    pub ar: f32,
    pub tar: f32,
    /// Gradient norm before clipping
    pub grad_norm: f32,
    /// KL weight the loss was computed with
    pub anneal: f32,
}

impl RvaeTrainer {
    /// Perform a single training step
    ///
    /// Zero grads, forward, loss, backward, clip, update, then advance the
    /// annealer. A non-finite loss aborts before any weight changes.
    pub fn train_step(&mut self, batch: &Batch) -> Result<StepStats> {
        self.ctx.train();
        let anneal = self.state.annealer.coefficient();

        {
            let mut params = self.model.parameters_mut();
            self.optimizer.zero_grad(&mut params);
        }

        // graph is dropped at the end of this block, before weights change
        let mut stats = {
            let output = self.model.forward(batch, &mut self.ctx)?;
            let mut terms = self.loss.compute(&output, batch, anneal);
            let loss = terms.total_value();
            if !loss.is_finite() {
                return Err(Error::NonFiniteLoss {
                    epoch: self.state.epoch + 1,
                    step: self.state.global_step + 1,
                    value: loss,
                });
            }
            backward(&mut terms.total, None);
            StepStats {
                loss,
                reconstruction: terms.reconstruction,
                kl: terms.kl,
                ar: terms.ar,
                tar: terms.tar,
                grad_norm: 0.0,
                anneal,
            }
        };

        let mut params = self.model.parameters_mut();
        stats.grad_norm = clip_grad_norm(&mut params, self.config.training.clip);
        self.optimizer.step(&mut params);

        self.state.global_step += 1;
        self.state.annealer.advance();
        Ok(stats)
    }
}
