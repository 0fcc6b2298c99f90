//! Learning rate schedulers
//!
//! - `MultiStepLR` - multiply the learning rate by a factor at fixed epochs

mod multi_step;

#[cfg(test)]
mod tests;

pub use multi_step::MultiStepLR;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (typically called after each epoch or batch)
    fn step(&mut self);
}
