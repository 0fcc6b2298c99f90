//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Plain SGD with L2 weight decay
///
/// The decay term is folded into the gradient (`g + wd * θ`) before the
/// update, matching coupled L2 regularisation.
pub struct SGD {
    lr: f32,
    weight_decay: f32,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32) -> Self {
        Self { lr, weight_decay: 0.0 }
    }

    /// Set the L2 weight decay coefficient
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }
}

/// `grad + weight_decay * param`
pub(crate) fn decayed_grad(grad: Array1<f32>, param: &Tensor, weight_decay: f32) -> Array1<f32> {
    if weight_decay == 0.0 {
        grad
    } else {
        let mut g = grad;
        g.scaled_add(weight_decay, param.data());
        g
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            let Some(grad) = param.grad() else {
                continue;
            };
            let grad = decayed_grad(grad, param, self.weight_decay);
            param.data_mut().scaled_add(-self.lr, &grad);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}
