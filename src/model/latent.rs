//! Gaussian posterior over the latent code
//!
//! The projector maps the encoder state to `mu` and `logvar`; sampling uses
//! the reparameterization `z = mu + exp(0.5 · logvar) · eps` so gradients
//! flow into both heads.

use super::linear::Linear;
use crate::autograd::{add, exp, gaussian_kl, mul, scale, Context, LatentMode};
use crate::Tensor;
use rand::rngs::StdRng;

/// `nhid → z_dim` heads for mean and log-variance
pub struct LatentProjector {
    pub mu: Linear,
    pub logvar: Linear,
}

/// Posterior parameters for one batch, `(batch × z_dim)` each
pub struct Posterior {
    pub mu: Tensor,
    pub logvar: Tensor,
}

impl LatentProjector {
    pub fn new(nhid: usize, z_dim: usize, rng: &mut StdRng) -> Self {
        Self {
            mu: Linear::new(nhid, z_dim, rng),
            logvar: Linear::new(nhid, z_dim, rng),
        }
    }

    pub fn z_dim(&self) -> usize {
        self.mu.out_features()
    }

    pub fn forward(&self, hidden: &Tensor) -> Posterior {
        Posterior {
            mu: self.mu.forward(hidden),
            logvar: self.logvar.forward(hidden),
        }
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.mu.parameters();
        params.extend(self.logvar.parameters());
        params
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.mu.parameters_mut();
        params.extend(self.logvar.parameters_mut());
        params
    }
}

/// `mu + exp(0.5 · logvar) · eps`
pub fn reparameterize(mu: &Tensor, logvar: &Tensor, eps: &Tensor) -> Tensor {
    add(mu, &mul(&exp(&scale(logvar, 0.5)), eps))
}

impl Posterior {
    /// Latent code according to the context's [`LatentMode`]
    ///
    /// Noise is drawn from the context RNG on every call.
    pub fn sample(&self, ctx: &mut Context) -> Tensor {
        match ctx.latent_mode() {
            LatentMode::Mean => self.mu.clone(),
            LatentMode::Sample => {
                let (rows, cols) = self.mu.shape();
                let eps = Tensor::from_matrix(ctx.standard_normal(rows * cols), rows, cols, false);
                reparameterize(&self.mu, &self.logvar, &eps)
            }
        }
    }

    /// KL divergence to N(0, I), averaged over rows
    pub fn kl(&self) -> Tensor {
        gaussian_kl(&self.mu, &self.logvar)
    }
}
