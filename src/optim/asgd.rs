//! Averaged Stochastic Gradient Descent

use super::sgd::decayed_grad;
use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Averaged SGD
///
/// Takes plain SGD steps (with coupled weight decay) and keeps, per parameter,
/// the arithmetic mean of every iterate produced since the optimizer was
/// created. Evaluation uses the averages through [`Optimizer::eval_params`].
pub struct ASGD {
    lr: f32,
    weight_decay: f32,
    steps: usize,
    averages: Vec<Array1<f32>>,
}

impl ASGD {
    /// Create a new ASGD optimizer
    pub fn new(lr: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            weight_decay,
            steps: 0,
            averages: Vec::new(),
        }
    }

    /// Number of averaged iterates
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Optimizer for ASGD {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                let grad = decayed_grad(grad, param, self.weight_decay);
                param.data_mut().scaled_add(-self.lr, &grad);
            }
        }

        self.steps += 1;
        if self.averages.len() != params.len() {
            self.averages = params.iter().map(|p| p.data().clone()).collect();
            return;
        }
        // ax += (θ - ax) / n
        let mu = 1.0 / self.steps as f32;
        for (avg, param) in self.averages.iter_mut().zip(params.iter()) {
            let delta = param.data() - &*avg;
            avg.scaled_add(mu, &delta);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn name(&self) -> &'static str {
        "asgd"
    }

    fn eval_params(&self) -> Option<Vec<Array1<f32>>> {
        if self.steps == 0 {
            None
        } else {
            Some(self.averages.clone())
        }
    }
}
