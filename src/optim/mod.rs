//! Optimizers for training neural networks

mod asgd;
mod clip;
mod optimizer;
mod scheduler;
mod sgd;

pub use asgd::ASGD;
pub use clip::{clip_grad_norm, grad_norm};
pub use optimizer::Optimizer;
pub use scheduler::{LRScheduler, MultiStepLR};
pub use sgd::SGD;
