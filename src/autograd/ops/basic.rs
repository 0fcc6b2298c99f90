//! Basic autograd operations: add, sub, mul, scale, sum, mean, bias broadcast, clamp

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

fn assert_same_shape(a: &Tensor, b: &Tensor, op: &str) {
    assert_eq!(
        a.shape(),
        b.shape(),
        "{op}: operand shapes {:?} and {:?} differ",
        a.shape(),
        b.shape()
    );
}

/// Add two tensors of the same shape
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape(a, b, "add");
    let data = a.data() + b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::op_result(data, a.rows(), a.cols(), requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            sign_b: 1.0,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

/// Subtract `b` from `a` (same shape)
pub fn sub(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape(a, b, "sub");
    let data = a.data() - b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::op_result(data, a.rows(), a.cols(), requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            sign_b: -1.0,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    sign_b: f32,
    result_grad: GradCell,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad * self.sign_b);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape(a, b, "mul");
    let data = a.data() * b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::op_result(data, a.rows(), a.cols(), requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(MulBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MulBackward {
    a: Tensor,
    b: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for MulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * b
                self.a.accumulate_grad(grad * self.b.data());
            }
            if self.b.requires_grad() {
                // ∂L/∂b = ∂L/∂out * a
                self.b.accumulate_grad(grad * self.a.data());
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Scale tensor by a scalar
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = a.data() * factor;
    let mut result = Tensor::op_result(data, a.rows(), a.cols(), a.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(ScaleBackward {
            a: a.clone(),
            factor,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
    result_grad: GradCell,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * self.factor);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Sum all elements into a `(1, 1)` tensor
pub fn sum(a: &Tensor) -> Tensor {
    reduce(a, 1.0)
}

/// Mean of all elements as a `(1, 1)` tensor
pub fn mean(a: &Tensor) -> Tensor {
    let n = a.len().max(1) as f32;
    reduce(a, 1.0 / n)
}

fn reduce(a: &Tensor, weight: f32) -> Tensor {
    let data = Array1::from(vec![a.data().sum() * weight]);
    let mut result = Tensor::op_result(data, 1, 1, a.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(SumBackward {
            a: a.clone(),
            weight,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SumBackward {
    a: Tensor,
    weight: f32,
    result_grad: GradCell,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a_i = ∂L/∂sum * weight (broadcast)
                let grad_a = Array1::from_elem(self.a.len(), grad[0] * self.weight);
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Add a `(1, n)` row vector to every row of an `(m, n)` matrix
pub fn add_row(a: &Tensor, row: &Tensor) -> Tensor {
    assert_eq!(row.rows(), 1, "add_row: bias must be a single row");
    assert_eq!(
        a.cols(),
        row.cols(),
        "add_row: bias width {} does not match matrix width {}",
        row.cols(),
        a.cols()
    );
    let cols = a.cols();
    let mut data = a.data().clone();
    for (i, v) in data.iter_mut().enumerate() {
        *v += row.data()[i % cols];
    }
    let requires_grad = a.requires_grad() || row.requires_grad();
    let mut result = Tensor::op_result(data, a.rows(), cols, requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(AddRowBackward {
            a: a.clone(),
            row: row.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddRowBackward {
    a: Tensor,
    row: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for AddRowBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.row.requires_grad() {
                let cols = self.row.cols();
                let mut grad_row = Array1::zeros(cols);
                for (i, g) in grad.iter().enumerate() {
                    grad_row[i % cols] += g;
                }
                self.row.accumulate_grad(grad_row);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.row.clone()]
    }
}

/// Element-wise `min(a, cap)`; gradient is zero where the cap binds
pub fn clamp_max(a: &Tensor, cap: f32) -> Tensor {
    let data = a.data().mapv(|v| v.min(cap));
    let mut result = Tensor::op_result(data, a.rows(), a.cols(), a.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(ClampMaxBackward {
            a: a.clone(),
            cap,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ClampMaxBackward {
    a: Tensor,
    cap: f32,
    result_grad: GradCell,
}

impl BackwardOp for ClampMaxBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                let pass = self.a.data().mapv(|v| if v < self.cap { 1.0 } else { 0.0 });
                self.a.accumulate_grad(grad * &pass);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}
