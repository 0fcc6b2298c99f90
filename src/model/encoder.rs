//! Recurrent encoder: sentence → final hidden state

use super::dropout::LockedDropout;
use super::embedding::embed_steps;
use super::lstm::{Lstm, LstmState};
use crate::autograd::Context;
use crate::config::ModelConfig;
use crate::train::Batch;
use crate::Tensor;
use rand::rngs::StdRng;

/// LSTM over the embedded input
pub struct Encoder {
    pub lstm: Lstm,
    dropoute: f32,
    dropouti: f32,
    dropouth: f32,
}

impl Encoder {
    pub fn new(config: &ModelConfig, rng: &mut StdRng) -> Self {
        Self {
            lstm: Lstm::new(config.emsize, config.nhid, config.wdrop, rng),
            dropoute: config.dropoute,
            dropouti: config.dropouti,
            dropouth: config.dropouth,
        }
    }

    /// Final hidden state `(batch × nhid)` at each column's last valid step
    ///
    /// The state starts from zeros for every call.
    pub fn forward(&self, table: &Tensor, batch: &Batch, ctx: &mut Context) -> Tensor {
        let inputs = embed_steps(table, &batch.input, self.dropoute, self.dropouti, ctx);
        let active: Vec<Vec<bool>> = (0..batch.seq_len()).map(|t| batch.active(t)).collect();
        let initial = LstmState::zeros(batch.batch_size(), self.lstm.hidden_size());
        let out = self.lstm.forward(&inputs, initial, &active, ctx);

        let locked = LockedDropout::sample(ctx, batch.batch_size(), self.lstm.hidden_size(), self.dropouth);
        locked.apply(&out.state.h)
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        self.lstm.parameters()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.lstm.parameters_mut()
    }
}
