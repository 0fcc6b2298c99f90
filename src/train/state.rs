//! Mutable bookkeeping of a training run

use super::anneal::KlAnnealer;
use crate::config::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the loop mutates besides weights and optimizer buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    pub seed: u64,
    /// Last epoch whose training pass finished
    pub epoch: usize,
    /// Optimizer steps taken
    pub global_step: usize,
    pub annealer: KlAnnealer,
    pub best_val_loss: Option<f32>,
    /// Validation loss per completed epoch
    pub val_history: Vec<f32>,
    /// Whether SGD has been replaced by ASGD
    pub asgd_active: bool,
}

impl TrainingState {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            seed: config.seed,
            epoch: 0,
            global_step: 0,
            annealer: KlAnnealer::new(
                config.kl_anneal_start,
                config.kl_anneal_rate,
                config.kl_anneal_delay,
                config.kl_anneal_cap,
            ),
            best_val_loss: None,
            val_history: Vec::new(),
            asgd_active: false,
        }
    }

    /// Non-monotone trigger: the new loss is worse than the best loss seen
    /// more than `nonmono` epochs ago
    ///
    /// Must be called before [`record_validation`](Self::record_validation).
    pub fn should_switch_to_asgd(&self, val_loss: f32, nonmono: usize) -> bool {
        if self.asgd_active || self.val_history.len() <= nonmono {
            return false;
        }
        let cutoff = self.val_history.len() - nonmono;
        let best_old = self.val_history[..cutoff].iter().copied().fold(f32::INFINITY, f32::min);
        val_loss > best_old
    }

    /// Append a validation loss; true when it beats the best so far
    pub fn record_validation(&mut self, val_loss: f32) -> bool {
        self.val_history.push(val_loss);
        let improved = self.best_val_loss.map_or(true, |best| val_loss < best);
        if improved {
            self.best_val_loss = Some(val_loss);
        }
        improved
    }
}

/// Result of the training phase, consumed by the final evaluation
#[derive(Debug, Clone)]
pub struct FinalModelState {
    pub state: TrainingState,
    /// Training stopped on a cancellation request
    pub cancelled: bool,
    /// Last checkpoint written, if any
    pub checkpoint: Option<PathBuf>,
}

impl FinalModelState {
    /// KL weight the run ended with
    pub fn anneal(&self) -> f32 {
        self.state.annealer.coefficient()
    }

    pub fn epochs_completed(&self) -> usize {
        self.state.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TrainingState {
        TrainingState::new(&TrainingConfig::default())
    }

    #[test]
    fn test_record_validation_tracks_best() {
        let mut s = state();
        assert!(s.record_validation(5.0));
        assert!(!s.record_validation(6.0));
        assert!(s.record_validation(4.0));
        assert_eq!(s.best_val_loss, Some(4.0));
        assert_eq!(s.val_history, vec![5.0, 6.0, 4.0]);
    }

    #[test]
    fn test_asgd_trigger_needs_full_window() {
        let mut s = state();
        for loss in [5.0, 4.0, 4.5] {
            assert!(!s.should_switch_to_asgd(9.0, 3));
            s.record_validation(loss);
        }
        // history [5, 4, 4.5], window 2: compare against min([5]) = 5
        assert!(s.should_switch_to_asgd(5.5, 2));
        assert!(!s.should_switch_to_asgd(4.9, 2));
    }

    #[test]
    fn test_asgd_trigger_fires_once() {
        let mut s = state();
        s.record_validation(1.0);
        s.record_validation(2.0);
        assert!(s.should_switch_to_asgd(3.0, 1));
        s.asgd_active = true;
        assert!(!s.should_switch_to_asgd(3.0, 1));
    }

    #[test]
    fn test_state_serializes() {
        let json = serde_json::to_string(&state()).expect("serialize");
        let back: TrainingState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state());
    }
}
