//! Recurrent decoder conditioned on the latent code

use super::dropout::LockedDropout;
use super::embedding::embed_steps;
use super::linear::Linear;
use super::lstm::{Lstm, LstmState};
use crate::autograd::{slice_cols, stack_rows, tanh, Context};
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Array2;
use rand::rngs::StdRng;

/// Logits plus the activations AR/TAR regularise
pub struct DecoderOutput {
    /// `(seq_len · batch × vocab)`, row `t · batch + b`
    pub logits: Tensor,
    /// LSTM output per step before output dropout
    pub raw_outputs: Vec<Tensor>,
    /// LSTM output per step after output dropout
    pub dropped_outputs: Vec<Tensor>,
}

/// `z` → initial state → teacher-forced LSTM → vocabulary logits
pub struct Decoder {
    pub latent_to_hidden: Linear,
    pub lstm: Lstm,
    pub output: Linear,
    dropoute: f32,
    dropouti: f32,
    dropout: f32,
}

impl Decoder {
    pub fn new(config: &ModelConfig, vocab_size: usize, rng: &mut StdRng) -> Self {
        Self {
            latent_to_hidden: Linear::new(config.z_dim, 2 * config.nhid, rng),
            lstm: Lstm::new(config.emsize, config.nhid, config.wdrop, rng),
            output: Linear::new(config.nhid, vocab_size, rng),
            dropoute: config.dropoute,
            dropouti: config.dropouti,
            dropout: config.dropout,
        }
    }

    /// `[h0 | c0] = latent_to_hidden(z)` with `h0` squashed by `tanh`
    pub fn initial_state(&self, z: &Tensor) -> LstmState {
        let hidden = self.lstm.hidden_size();
        let hc = self.latent_to_hidden.forward(z);
        LstmState {
            h: tanh(&slice_cols(&hc, 0, hidden)),
            c: slice_cols(&hc, hidden, 2 * hidden),
        }
    }

    /// Decode `input` (already word-dropped) from `z`
    ///
    /// `active[t][b]` marks valid steps. Fails before any computation when `z`
    /// does not have one row per sentence or the wrong width.
    pub fn forward(
        &self,
        table: &Tensor,
        z: &Tensor,
        input: &Array2<usize>,
        active: &[Vec<bool>],
        ctx: &mut Context,
    ) -> Result<DecoderOutput> {
        let batch = input.ncols();
        if z.rows() != batch {
            return Err(Error::shape_mismatch("decoder latent rows", batch, z.rows()));
        }
        if z.cols() != self.latent_to_hidden.in_features() {
            return Err(Error::shape_mismatch(
                "decoder latent width",
                self.latent_to_hidden.in_features(),
                z.cols(),
            ));
        }

        let initial = self.initial_state(z);
        let inputs = embed_steps(table, input, self.dropoute, self.dropouti, ctx);
        let out = self.lstm.forward(&inputs, initial, active, ctx);

        let locked = LockedDropout::sample(ctx, batch, self.lstm.hidden_size(), self.dropout);
        let dropped_outputs: Vec<Tensor> = out.outputs.iter().map(|h| locked.apply(h)).collect();
        let logits = self.output.forward(&stack_rows(&dropped_outputs));

        Ok(DecoderOutput {
            logits,
            raw_outputs: out.outputs,
            dropped_outputs,
        })
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.latent_to_hidden.parameters();
        params.extend(self.lstm.parameters());
        params.extend(self.output.parameters());
        params
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.latent_to_hidden.parameters_mut();
        params.extend(self.lstm.parameters_mut());
        params.extend(self.output.parameters_mut());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn config() -> ModelConfig {
        ModelConfig {
            emsize: 4,
            nhid: 5,
            z_dim: 3,
            ..ModelConfig::default()
        }
    }

    fn setup() -> (Decoder, Tensor) {
        let mut rng = StdRng::seed_from_u64(0);
        let decoder = Decoder::new(&config(), 9, &mut rng);
        let table = Tensor::from_matrix(vec![0.1; 36], 9, 4, false);
        (decoder, table)
    }

    #[test]
    fn test_logits_are_time_major() {
        let (decoder, table) = setup();
        let mut ctx = Context::new(0);
        ctx.eval();
        let input = Array2::from_shape_vec((3, 2), vec![2, 2, 5, 6, 7, 0]).unwrap();
        let active = vec![vec![true, true], vec![true, true], vec![true, false]];
        let z = Tensor::zeros_matrix(2, 3, false);
        let out = decoder.forward(&table, &z, &input, &active, &mut ctx).unwrap();
        assert_eq!(out.logits.shape(), (6, 9));
        assert_eq!(out.raw_outputs.len(), 3);
        assert_eq!(out.dropped_outputs[0].shape(), (2, 5));
    }

    #[test]
    fn test_rejects_latent_with_wrong_batch() {
        let (decoder, table) = setup();
        let mut ctx = Context::new(0);
        let input = Array2::from_elem((2, 3), 2);
        let z = Tensor::zeros_matrix(2, 3, false);
        let err = decoder
            .forward(&table, &z, &input, &vec![vec![true; 3]; 2], &mut ctx)
            .err()
            .expect("batch 3 with 2 latent rows must fail");
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_initial_hidden_is_bounded() {
        let (decoder, _) = setup();
        let z = Tensor::from_matrix(vec![50.0; 6], 2, 3, false);
        let state = decoder.initial_state(&z);
        assert!(state.h.data().iter().all(|v| v.abs() <= 1.0));
        assert_eq!(state.c.shape(), (2, 5));
    }
}
