//! KL weight annealing

use serde::{Deserialize, Serialize};

/// Where the annealer is in its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnealPhase {
    /// Before the delay epoch; weight stays at its initial value
    Delayed,
    /// Weight grows by `rate` per training batch
    Annealing,
    /// Weight has reached the cap
    Saturated,
}

/// KL coefficient schedule: `Delayed → Annealing → Saturated`
///
/// The coefficient never decreases and never exceeds the cap. Phases only
/// move forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlAnnealer {
    coefficient: f32,
    rate: f32,
    delay: usize,
    cap: f32,
    phase: AnnealPhase,
}

impl KlAnnealer {
    /// Start at `initial`, grow by `rate` per batch from epoch `delay`, stop at `cap`
    pub fn new(initial: f32, rate: f32, delay: usize, cap: f32) -> Self {
        let coefficient = initial.min(cap);
        let phase = if coefficient >= cap {
            AnnealPhase::Saturated
        } else {
            AnnealPhase::Delayed
        };
        Self {
            coefficient,
            rate,
            delay,
            cap,
            phase,
        }
    }

    /// Current weight
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    pub fn phase(&self) -> AnnealPhase {
        self.phase
    }

    /// Called at the start of each (1-based) epoch
    pub fn begin_epoch(&mut self, epoch: usize) {
        if self.phase == AnnealPhase::Delayed && epoch >= self.delay {
            self.phase = AnnealPhase::Annealing;
        }
    }

    /// Called once per training batch
    pub fn advance(&mut self) {
        if self.phase != AnnealPhase::Annealing {
            return;
        }
        let next = self.coefficient + self.rate;
        if next >= self.cap {
            self.coefficient = self.cap;
            self.phase = AnnealPhase::Saturated;
        } else {
            self.coefficient = next;
        }
    }
}
