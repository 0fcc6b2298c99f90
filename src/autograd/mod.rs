//! Tape-based autograd engine
//!
//! Provides automatic differentiation using a computational graph recorded by
//! the ops as they run. [`backward`] walks the graph in reverse topological
//! order, so sub-graphs reused across recurrent time steps receive each
//! gradient contribution exactly once.
//!
//! ```
//! use rvae::autograd::{backward, matmul_2d, sum, Tensor};
//!
//! let x = Tensor::from_matrix(vec![1.0, 2.0], 1, 2, false);
//! let w = Tensor::from_matrix(vec![0.5, -0.5], 2, 1, true);
//! let mut y = sum(&matmul_2d(&x, &w));
//! backward(&mut y, None);
//! assert_eq!(w.grad().unwrap().to_vec(), vec![1.0, 2.0]);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use context::{is_grad_enabled, Context, LatentMode, NoGradGuard};
pub use ops::*;
pub use tensor::{GradCell, Tensor};
