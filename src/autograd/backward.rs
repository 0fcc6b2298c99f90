//! Backward operation trait and graph traversal

use super::Tensor;
use ndarray::Array1;
use std::collections::HashSet;
use std::rc::Rc;

/// A recorded differentiable operation
///
/// `backward` reads the gradient of the op's result and accumulates the
/// corresponding gradients into its inputs. It must not recurse: traversal
/// order is owned by [`backward`], which guarantees that a node's gradient is
/// complete before its op runs.
pub trait BackwardOp {
    /// Propagate the result gradient one level into the inputs
    fn backward(&self);

    /// Tensors read during the forward computation
    fn inputs(&self) -> Vec<Tensor>;
}

/// Perform the backward pass from `tensor`
///
/// Seeds the gradient with `grad_output` (ones for a scalar loss when `None`)
/// and runs every reachable op in reverse topological order.
pub fn backward(tensor: &mut Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    tensor.set_grad(seed);

    for op in topological_ops(tensor).into_iter().rev() {
        op.backward();
    }
}

/// Ops reachable from `root`, ordered so every op comes after the ops that
/// produced its inputs.
fn topological_ops(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    // (node, children already pushed)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let Some(op) = node.backward_op() else {
            continue;
        };
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        stack.push((node, true));
        for input in op.inputs() {
            if input.backward_op().is_some() && !visited.contains(&input.id()) {
                stack.push((input, false));
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{add, mul, sum};

    #[test]
    fn test_shared_subgraph_counted_once_per_use() {
        // y = (a * a) + (a * a) reusing the same product node twice
        let a = Tensor::from_vec(vec![3.0], true);
        let sq = mul(&a, &a);
        let mut y = add(&sq, &sq);
        backward(&mut y, None);
        // dy/da = 4a
        assert_eq!(a.grad().unwrap()[0], 12.0);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let a = Tensor::from_vec(vec![1.0], true);
        let mut h = a.clone();
        for _ in 0..5_000 {
            h = add(&h, &a);
        }
        let mut s = sum(&h);
        backward(&mut s, None);
        assert_eq!(a.grad().unwrap()[0], 5_001.0);
    }
}
