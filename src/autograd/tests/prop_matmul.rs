//! Property-based tests for matmul operations

use super::test_utils::{analytical_gradient, finite_difference, seeded_values};
use crate::autograd::{add_row, matmul, sum, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_matmul_backward_gradient_check(
        m in 1usize..5,
        k in 1usize..5,
        n in 1usize..5,
        seed in 0u64..1000,
    ) {
        let a_data = seeded_values(seed, m * k, 3.0);
        let b_data = seeded_values(seed + 7, k * n, 3.0);
        let b = Tensor::from_matrix(b_data.clone(), k, n, false);

        let analytical_a = analytical_gradient(|a| sum(&matmul(a, &b, m, k, n)), &a_data, m, k);
        let numerical_a = finite_difference(
            |v| {
                let t_a = Tensor::from_matrix(v.to_vec(), m, k, false);
                matmul(&t_a, &b, m, k, n).data().sum()
            },
            &a_data,
            1e-2,
        );

        for i in 0..a_data.len() {
            let diff = (analytical_a[i] - numerical_a[i]).abs();
            prop_assert!(diff < 0.05,
                "Gradient mismatch at index {}: m={}, k={}, n={}, analytical={}, numerical={}",
                i, m, k, n, analytical_a[i], numerical_a[i]);
        }

        let a = Tensor::from_matrix(a_data, m, k, false);
        let analytical_b = analytical_gradient(|b| sum(&matmul(&a, b, m, k, n)), &b_data, k, n);
        // ∂sum(AB)/∂B[p, j] = Σ_i A[i, p]
        for p in 0..k {
            let col_sum: f32 = (0..m).map(|i| a.get(i, p)).sum();
            for j in 0..n {
                prop_assert!((analytical_b[p * n + j] - col_sum).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn prop_add_row_bias_gradient_is_row_count(
        rows in 1usize..6,
        cols in 1usize..6,
    ) {
        let x = Tensor::zeros_matrix(rows, cols, false);
        let bias = vec![0.0; cols];
        let grad = analytical_gradient(|b| sum(&add_row(&x, b)), &bias, 1, cols);
        for g in grad {
            prop_assert!((g - rows as f32).abs() < 1e-6);
        }
    }
}
