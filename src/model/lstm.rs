//! Single-layer LSTM with DropConnect on the recurrent weights

use super::dropout::weight_drop;
use super::linear::uniform;
use crate::autograd::{add, add_row, matmul_2d, mul, select_rows, sigmoid, slice_cols, tanh, Context};
use crate::Tensor;
use rand::rngs::StdRng;

/// Recurrent state `(h, c)`, each `(batch × hidden)`
#[derive(Clone)]
pub struct LstmState {
    pub h: Tensor,
    pub c: Tensor,
}

impl LstmState {
    /// All-zero state
    pub fn zeros(batch: usize, hidden: usize) -> Self {
        Self {
            h: Tensor::zeros_matrix(batch, hidden, false),
            c: Tensor::zeros_matrix(batch, hidden, false),
        }
    }
}

/// Per-step outputs and the final state
pub struct LstmOutput {
    /// `h_t` for every step, `(batch × hidden)` each
    pub outputs: Vec<Tensor>,
    /// State after each column's last valid step
    pub state: LstmState,
}

/// LSTM layer
///
/// Gates are computed with one product per operand into a `4·hidden` wide
/// block ordered input, forget, cell, output.
pub struct Lstm {
    pub w_ih: Tensor,
    pub w_hh: Tensor,
    pub bias: Tensor,
    wdrop: f32,
}

impl Lstm {
    /// Parameters from U(-1/√hidden, 1/√hidden)
    pub fn new(input_size: usize, hidden_size: usize, wdrop: f32, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (hidden_size as f32).sqrt();
        let gates = 4 * hidden_size;
        Self {
            w_ih: Tensor::from_matrix(uniform(rng, input_size * gates, bound), input_size, gates, true),
            w_hh: Tensor::from_matrix(uniform(rng, hidden_size * gates, bound), hidden_size, gates, true),
            bias: Tensor::from_matrix(uniform(rng, gates, bound), 1, gates, true),
            wdrop,
        }
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.rows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_hh.rows()
    }

    /// One step with an explicit recurrent matrix
    pub fn cell(&self, x: &Tensor, state: &LstmState, w_hh: &Tensor) -> LstmState {
        let hidden = self.hidden_size();
        let gates = add_row(&add(&matmul_2d(x, &self.w_ih), &matmul_2d(&state.h, w_hh)), &self.bias);

        let i = sigmoid(&slice_cols(&gates, 0, hidden));
        let f = sigmoid(&slice_cols(&gates, hidden, 2 * hidden));
        let g = tanh(&slice_cols(&gates, 2 * hidden, 3 * hidden));
        let o = sigmoid(&slice_cols(&gates, 3 * hidden, 4 * hidden));

        let c = add(&mul(&f, &state.c), &mul(&i, &g));
        let h = mul(&o, &tanh(&c));
        LstmState { h, c }
    }

    /// Run over `inputs` (one `(batch × input)` tensor per step)
    ///
    /// `active[t][b]` is false once column `b` has ended; such columns keep
    /// their previous state so the final state is the one at the last valid
    /// step. The recurrent weights are dropped once per call.
    pub fn forward(
        &self,
        inputs: &[Tensor],
        initial: LstmState,
        active: &[Vec<bool>],
        ctx: &mut Context,
    ) -> LstmOutput {
        debug_assert_eq!(inputs.len(), active.len());
        let w_hh = weight_drop(ctx, &self.w_hh, self.wdrop);

        let mut state = initial;
        let mut outputs = Vec::with_capacity(inputs.len());
        for (x, mask) in inputs.iter().zip(active) {
            let next = self.cell(x, &state, &w_hh);
            state = if mask.iter().all(|&m| m) {
                next
            } else {
                LstmState {
                    h: select_rows(mask, &next.h, &state.h),
                    c: select_rows(mask, &next.c, &state.c),
                }
            };
            outputs.push(state.h.clone());
        }
        LstmOutput { outputs, state }
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.w_ih, &self.w_hh, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w_ih, &mut self.w_hh, &mut self.bias]
    }
}
