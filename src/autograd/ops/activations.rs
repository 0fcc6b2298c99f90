//! Element-wise activation autograd operations: sigmoid, tanh, exp

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

#[derive(Clone, Copy)]
enum Activation {
    Sigmoid,
    Tanh,
    Exp,
}

impl Activation {
    fn forward(self, x: f32) -> f32 {
        match self {
            Self::Sigmoid => {
                if x >= 0.0 {
                    1.0 / (1.0 + (-x).exp())
                } else {
                    let e = x.exp();
                    e / (1.0 + e)
                }
            }
            Self::Tanh => x.tanh(),
            Self::Exp => x.exp(),
        }
    }

    /// Derivative expressed through the forward output `y`
    fn derivative(self, y: f32) -> f32 {
        match self {
            Self::Sigmoid => y * (1.0 - y),
            Self::Tanh => 1.0 - y * y,
            Self::Exp => y,
        }
    }
}

/// Logistic sigmoid
pub fn sigmoid(a: &Tensor) -> Tensor {
    activate(a, Activation::Sigmoid)
}

/// Hyperbolic tangent
pub fn tanh(a: &Tensor) -> Tensor {
    activate(a, Activation::Tanh)
}

/// Element-wise exponential
pub fn exp(a: &Tensor) -> Tensor {
    activate(a, Activation::Exp)
}

fn activate(a: &Tensor, kind: Activation) -> Tensor {
    let data = a.data().mapv(|x| kind.forward(x));
    let mut result = Tensor::op_result(data, a.rows(), a.cols(), a.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(ActivationBackward {
            a: a.clone(),
            output: result.data().clone(),
            kind,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ActivationBackward {
    a: Tensor,
    output: Array1<f32>,
    kind: Activation,
    result_grad: GradCell,
}

impl BackwardOp for ActivationBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                let local = self.output.mapv(|y| self.kind.derivative(y));
                self.a.accumulate_grad(grad * &local);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}
