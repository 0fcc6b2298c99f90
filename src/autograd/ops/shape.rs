//! Shape operations: column slicing, row stacking, per-row selection

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Columns `start..end` of every row
pub fn slice_cols(a: &Tensor, start: usize, end: usize) -> Tensor {
    assert!(
        start < end && end <= a.cols(),
        "slice_cols: range {start}..{end} invalid for width {}",
        a.cols()
    );
    let (rows, cols) = a.shape();
    let width = end - start;
    let mut data = Vec::with_capacity(rows * width);
    for r in 0..rows {
        let offset = r * cols;
        data.extend(a.data().iter().skip(offset + start).take(width));
    }
    let mut result = Tensor::op_result(Array1::from(data), rows, width, a.requires_grad());

    if result.requires_grad() {
        let backward_op = Rc::new(SliceColsBackward {
            a: a.clone(),
            start,
            width,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SliceColsBackward {
    a: Tensor,
    start: usize,
    width: usize,
    result_grad: GradCell,
}

impl BackwardOp for SliceColsBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                let (rows, cols) = self.a.shape();
                let mut grad_a = Array1::zeros(rows * cols);
                for r in 0..rows {
                    for c in 0..self.width {
                        grad_a[r * cols + self.start + c] = grad[r * self.width + c];
                    }
                }
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Stack same-width matrices vertically
pub fn stack_rows(parts: &[Tensor]) -> Tensor {
    assert!(!parts.is_empty(), "stack_rows: nothing to stack");
    let cols = parts[0].cols();
    for p in parts {
        assert_eq!(p.cols(), cols, "stack_rows: width {} differs from {cols}", p.cols());
    }
    let rows: usize = parts.iter().map(Tensor::rows).sum();
    let mut data = Vec::with_capacity(rows * cols);
    for p in parts {
        data.extend(p.data().iter());
    }
    let requires_grad = parts.iter().any(Tensor::requires_grad);
    let mut result = Tensor::op_result(Array1::from(data), rows, cols, requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(StackRowsBackward {
            parts: parts.to_vec(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct StackRowsBackward {
    parts: Vec<Tensor>,
    result_grad: GradCell,
}

impl BackwardOp for StackRowsBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let mut offset = 0;
            for p in &self.parts {
                let len = p.len();
                if p.requires_grad() {
                    let slice = grad.slice(ndarray::s![offset..offset + len]).to_owned();
                    p.accumulate_grad(slice);
                }
                offset += len;
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.parts.clone()
    }
}

/// Row-wise choice: row `r` comes from `on_true` when `mask[r]`, else from `on_false`
pub fn select_rows(mask: &[bool], on_true: &Tensor, on_false: &Tensor) -> Tensor {
    assert_eq!(
        on_true.shape(),
        on_false.shape(),
        "select_rows: operand shapes {:?} and {:?} differ",
        on_true.shape(),
        on_false.shape()
    );
    assert_eq!(mask.len(), on_true.rows(), "select_rows: mask length must equal row count");
    let (rows, cols) = on_true.shape();
    let mut data = Array1::zeros(rows * cols);
    for (r, &pick) in mask.iter().enumerate() {
        let src = if pick { on_true } else { on_false };
        for c in 0..cols {
            data[r * cols + c] = src.data()[r * cols + c];
        }
    }
    let requires_grad = on_true.requires_grad() || on_false.requires_grad();
    let mut result = Tensor::op_result(data, rows, cols, requires_grad);

    if result.requires_grad() {
        let backward_op = Rc::new(SelectRowsBackward {
            mask: mask.to_vec(),
            on_true: on_true.clone(),
            on_false: on_false.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SelectRowsBackward {
    mask: Vec<bool>,
    on_true: Tensor,
    on_false: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for SelectRowsBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let cols = self.on_true.cols();
            let routed = |want: bool| {
                let mut g = grad.clone();
                for (r, &pick) in self.mask.iter().enumerate() {
                    if pick != want {
                        g.slice_mut(ndarray::s![r * cols..(r + 1) * cols]).fill(0.0);
                    }
                }
                g
            };
            if self.on_true.requires_grad() {
                self.on_true.accumulate_grad(routed(true));
            }
            if self.on_false.requires_grad() {
                self.on_false.accumulate_grad(routed(false));
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.on_true.clone(), self.on_false.clone()]
    }
}
