//! Matrix multiplication
//!
//! Tensors store flat row-major data; products are computed on `ArrayView2`
//! views so the forward GEMM and both backward GEMMs go through `dot`.

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, ArrayView2};
use std::rc::Rc;

fn view(data: &Array1<f32>, rows: usize, cols: usize) -> ArrayView2<'_, f32> {
    data.view()
        .into_shape_with_order((rows, cols))
        .expect("flat buffer length matches its logical shape")
}

fn flatten(a: ndarray::Array2<f32>) -> Array1<f32> {
    a.into_iter().collect()
}

/// `C = A @ B` for `A: (m, k)` and `B: (k, n)` stored flat
///
/// # Panics
///
/// Panics if the tensor lengths are not `m·k` and `k·n`.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "matmul: left operand is not {m}x{k}");
    assert_eq!(b.len(), k * n, "matmul: right operand is not {k}x{n}");

    let product = view(a.data(), m, k).dot(&view(b.data(), k, n));
    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::op_result(flatten(product), m, n, requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

/// `x (rows×in) @ w (in×out)` using the tensors' own shapes
pub fn matmul_2d(x: &Tensor, w: &Tensor) -> Tensor {
    assert_eq!(
        x.cols(),
        w.rows(),
        "matmul: inner dimensions differ ({:?} @ {:?})",
        x.shape(),
        w.shape()
    );
    matmul(x, w, x.rows(), x.cols(), w.cols())
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad_c = view(grad, self.m, self.n);

            // dA = dC @ Bᵀ
            if self.a.requires_grad() {
                let b = view(self.b.data(), self.k, self.n);
                self.a.accumulate_grad(flatten(grad_c.dot(&b.t())));
            }

            // dB = Aᵀ @ dC
            if self.b.requires_grad() {
                let a = view(self.a.data(), self.m, self.k);
                self.b.accumulate_grad(flatten(a.t().dot(&grad_c)));
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}
