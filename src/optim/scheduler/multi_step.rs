//! Milestone learning rate scheduler

use super::LRScheduler;
use crate::optim::Optimizer;

/// Multi-step learning rate scheduler
///
/// Multiplies the learning rate by `gamma` each time the epoch counter reaches
/// one of the milestones.
///
/// Formula: lr_e = lr_initial * gamma^(|{m ∈ milestones : m <= e}|)
///
/// The counter starts at 0. Training sets it to the (1-based) epoch about to
/// run with [`MultiStepLR::set_epoch`], so the decay for milestone `m` applies
/// to epoch `m` itself and a re-run epoch gets the same rate.
#[derive(Debug, Clone)]
pub struct MultiStepLR {
    lr_initial: f32,
    gamma: f32,
    milestones: Vec<usize>,
    current_epoch: usize,
}

impl MultiStepLR {
    /// Create a new multi-step scheduler
    ///
    /// # Arguments
    /// * `lr_initial` - Initial learning rate
    /// * `milestones` - Epochs at which to decay (order does not matter)
    /// * `gamma` - Multiplicative factor (e.g., 0.7)
    pub fn new(lr_initial: f32, milestones: &[usize], gamma: f32) -> Self {
        let mut milestones = milestones.to_vec();
        milestones.sort_unstable();
        milestones.dedup();
        Self {
            lr_initial,
            gamma,
            milestones,
            current_epoch: 0,
        }
    }

    /// Current epoch counter
    pub fn epoch(&self) -> usize {
        self.current_epoch
    }

    /// Jump to `epoch`
    pub fn set_epoch(&mut self, epoch: usize) {
        self.current_epoch = epoch;
    }

    /// True when the current epoch is a milestone
    pub fn at_milestone(&self) -> bool {
        self.milestones.binary_search(&self.current_epoch).is_ok()
    }

    /// Apply the current learning rate to an optimizer
    pub fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}

impl LRScheduler for MultiStepLR {
    fn get_lr(&self) -> f32 {
        let passed = self.milestones.iter().filter(|&&m| m <= self.current_epoch).count();
        self.lr_initial * self.gamma.powi(passed as i32)
    }

    fn step(&mut self) {
        self.set_epoch(self.current_epoch + 1);
    }
}
