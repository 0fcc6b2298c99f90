//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are passed as mutable references borrowed from the model, in
/// the same order on every call; optimizers key their per-parameter state by
/// position.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Parameter values to evaluate with, when they differ from the live
    /// iterate (averaged SGD). `None` means "use the live parameters".
    fn eval_params(&self) -> Option<Vec<ndarray::Array1<f32>>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// Minimal optimizer implementation for testing default trait methods
    struct TestOptimizer {
        learning_rate: f32,
    }

    impl Optimizer for TestOptimizer {
        fn step(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad() {
                    let data = param.data_mut();
                    data.scaled_add(-self.learning_rate, &grad);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }

        fn name(&self) -> &'static str {
            "test"
        }
    }

    #[test]
    fn test_optimizer_zero_grad() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut p1 = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut p2 = Tensor::from_vec(vec![3.0], true);
        p1.set_grad(arr1(&[0.5, 1.0]));
        p2.set_grad(arr1(&[1.5]));

        opt.zero_grad(&mut [&mut p1, &mut p2]);
        assert!(p1.grad().is_none());
        assert!(p2.grad().is_none());
    }

    #[test]
    fn test_optimizer_defaults() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        assert!(opt.eval_params().is_none());
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }
}
