//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod embedding;
mod loss;
mod matmul;
mod shape;

// Re-export all public operations
pub use activations::{exp, sigmoid, tanh};
pub use basic::{add, add_row, clamp_max, mean, mul, scale, sub, sum};
pub use embedding::embedding;
pub use loss::{cross_entropy, gaussian_kl};
pub use matmul::{matmul, matmul_2d};
pub use shape::{select_rows, slice_cols, stack_rows};
