//! Tests for learning rate schedulers

use super::*;
use crate::optim::{Optimizer, SGD};
use approx::assert_abs_diff_eq;

#[test]
fn test_multi_step_initial_lr() {
    let scheduler = MultiStepLR::new(1.0, &[15, 25, 35, 45], 0.7);
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_multi_step_decays_exactly_at_milestones() {
    let mut scheduler = MultiStepLR::new(1.0, &[15, 25, 35, 45], 0.7);
    let mut lrs = Vec::new();
    for _ in 0..50 {
        scheduler.step();
        lrs.push(scheduler.get_lr());
    }

    // lrs[e - 1] is the rate used for epoch e
    assert_abs_diff_eq!(lrs[13], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(lrs[14], 0.7, epsilon = 1e-6);
    assert_abs_diff_eq!(lrs[23], 0.7, epsilon = 1e-6);
    assert_abs_diff_eq!(lrs[24], 0.49, epsilon = 1e-6);
    assert_abs_diff_eq!(lrs[44], 0.7f32.powi(4), epsilon = 1e-6);
    assert_abs_diff_eq!(lrs[49], 0.7f32.powi(4), epsilon = 1e-6);
}

#[test]
fn test_multi_step_milestone_flag() {
    let mut scheduler = MultiStepLR::new(1.0, &[2], 0.5);
    scheduler.step();
    assert!(!scheduler.at_milestone());
    scheduler.step();
    assert!(scheduler.at_milestone());
    assert_eq!(scheduler.epoch(), 2);
}

#[test]
fn test_multi_step_set_epoch_is_absolute() {
    let mut scheduler = MultiStepLR::new(1.0, &[2], 0.5);
    scheduler.set_epoch(1);
    scheduler.set_epoch(1);
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-6);
    scheduler.set_epoch(2);
    assert!(scheduler.at_milestone());
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_multi_step_unsorted_milestones() {
    let mut scheduler = MultiStepLR::new(2.0, &[3, 1, 3], 0.5);
    for _ in 0..3 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_multi_step_apply_to_optimizer() {
    let mut scheduler = MultiStepLR::new(1.0, &[1], 0.7);
    let mut optimizer = SGD::new(1.0);
    scheduler.step();
    scheduler.apply(&mut optimizer);
    assert_abs_diff_eq!(optimizer.lr(), 0.7, epsilon = 1e-6);
}
