//! Execution context: train/eval mode, randomness, gradient recording

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether ops currently record a backward graph
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Disables graph recording on this thread until dropped
pub struct NoGradGuard {
    previous: bool,
}

impl NoGradGuard {
    /// Start a no-grad region
    pub fn new() -> Self {
        let previous = GRAD_ENABLED.with(|g| g.replace(false));
        Self { previous }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|g| g.set(self.previous));
    }
}

/// How the latent code is produced from the posterior parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatentMode {
    /// `z = mu + exp(0.5 * logvar) * eps`
    #[default]
    Sample,
    /// `z = mu`
    Mean,
}

/// Context for a forward pass
///
/// Owns every source of randomness the model consumes (dropout masks, word
/// dropout, latent noise) so a run is reproducible from its seed.
pub struct Context {
    training: bool,
    latent_mode: LatentMode,
    rng: StdRng,
}

impl Context {
    /// Create a training-mode context seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            training: true,
            latent_mode: LatentMode::Sample,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Latent sampling policy
    pub fn latent_mode(&self) -> LatentMode {
        self.latent_mode
    }

    /// Change the latent sampling policy
    pub fn set_latent_mode(&mut self, mode: LatentMode) {
        self.latent_mode = mode;
    }

    /// `len` draws from N(0, 1)
    pub fn standard_normal(&mut self, len: usize) -> Vec<f32> {
        (0..len).map(|_| self.rng.sample::<f32, _>(StandardNormal)).collect()
    }

    /// Inverted-dropout mask: each entry is `1 / (1 - p)` with probability
    /// `1 - p`, otherwise 0.
    pub fn dropout_mask(&mut self, len: usize, p: f32) -> Vec<f32> {
        let keep = 1.0 - p;
        let scale = 1.0 / keep;
        (0..len)
            .map(|_| if self.rng.random::<f32>() < keep { scale } else { 0.0 })
            .collect()
    }

    /// True with probability `p`
    pub fn bernoulli(&mut self, p: f32) -> bool {
        self.rng.random::<f32>() < p
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new(1);
        assert!(ctx.is_training());
        assert_eq!(ctx.latent_mode(), LatentMode::Sample);
    }

    #[test]
    fn test_context_train_mode() {
        let mut ctx = Context::new(1);
        ctx.eval();
        assert!(!ctx.is_training());

        ctx.train();
        assert!(ctx.is_training());
    }

    #[test]
    fn test_same_seed_repeats_stream() {
        let first = Context::new(7).standard_normal(4);
        assert_eq!(first, Context::new(7).standard_normal(4));
        assert_ne!(first, Context::new(8).standard_normal(4));
    }

    #[test]
    fn test_dropout_mask_values() {
        let mut ctx = Context::new(3);
        let mask = ctx.dropout_mask(1000, 0.25);
        for m in &mask {
            assert!(*m == 0.0 || (*m - 1.0 / 0.75).abs() < 1e-6);
        }
        let kept = mask.iter().filter(|m| **m > 0.0).count();
        assert!(kept > 650 && kept < 850, "kept {kept}");
    }

    #[test]
    fn test_no_grad_guard_restores() {
        assert!(is_grad_enabled());
        {
            let _guard = NoGradGuard::new();
            assert!(!is_grad_enabled());
            {
                let _inner = NoGradGuard::new();
                assert!(!is_grad_enabled());
            }
            assert!(!is_grad_enabled());
        }
        assert!(is_grad_enabled());
    }
}
