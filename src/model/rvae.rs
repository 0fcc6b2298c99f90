//! Recurrent variational autoencoder

use super::decoder::Decoder;
use super::dropout::word_dropout;
use super::encoder::Encoder;
use super::latent::{LatentProjector, Posterior};
use super::linear::uniform;
use crate::autograd::Context;
use crate::config::ModelConfig;
use crate::data::SpecialTokens;
use crate::error::{Error, Result};
use crate::train::Batch;
use crate::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything one forward pass produces
pub struct RvaeOutput {
    /// `(seq_len · batch × vocab)`, time-major
    pub logits: Tensor,
    pub posterior: Posterior,
    /// Latent code fed to the decoder
    pub z: Tensor,
    pub raw_outputs: Vec<Tensor>,
    pub dropped_outputs: Vec<Tensor>,
}

/// Encoder, latent bottleneck and decoder sharing one embedding matrix
pub struct Rvae {
    pub embedding: Tensor,
    pub encoder: Encoder,
    pub projector: LatentProjector,
    pub decoder: Decoder,
    config: ModelConfig,
    vocab_size: usize,
    specials: SpecialTokens,
}

impl Rvae {
    /// Build with weights drawn from a generator seeded by `seed`
    pub fn new(config: &ModelConfig, vocab_size: usize, seed: u64) -> Result<Self> {
        if vocab_size <= SpecialTokens::default().eos {
            return Err(Error::Config(format!(
                "vocabulary of size {vocab_size} cannot hold the special tokens"
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let embedding = Tensor::from_matrix(
            uniform(&mut rng, vocab_size * config.emsize, 0.1),
            vocab_size,
            config.emsize,
            true,
        );
        Ok(Self {
            embedding,
            encoder: Encoder::new(config, &mut rng),
            projector: LatentProjector::new(config.nhid, config.z_dim, &mut rng),
            decoder: Decoder::new(config, vocab_size, &mut rng),
            config: config.clone(),
            vocab_size,
            specials: SpecialTokens::default(),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn z_dim(&self) -> usize {
        self.projector.z_dim()
    }

    /// Encode, sample, decode
    ///
    /// Word dropout, dropout masks and latent noise all come from `ctx`.
    pub fn forward(&self, batch: &Batch, ctx: &mut Context) -> Result<RvaeOutput> {
        if let Some(id) = batch.max_id().filter(|&id| id >= self.vocab_size) {
            return Err(Error::TokenOutOfRange {
                id,
                vocab_size: self.vocab_size,
            });
        }

        let hidden = self.encoder.forward(&self.embedding, batch, ctx);
        let posterior = self.projector.forward(&hidden);
        let z = posterior.sample(ctx);

        let decoder_input = word_dropout(ctx, &batch.input, self.config.keep_rate, self.specials);
        let active: Vec<Vec<bool>> = (0..batch.seq_len()).map(|t| batch.active(t)).collect();
        let decoded = self.decoder.forward(&self.embedding, &z, &decoder_input, &active, ctx)?;

        Ok(RvaeOutput {
            logits: decoded.logits,
            posterior,
            z,
            raw_outputs: decoded.raw_outputs,
            dropped_outputs: decoded.dropped_outputs,
        })
    }

    /// Parameters in a fixed order, paired with stable names
    pub fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        PARAMETER_NAMES
            .iter()
            .map(|n| n.to_string())
            .zip(self.parameters())
            .collect()
    }

    pub fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        PARAMETER_NAMES
            .iter()
            .map(|n| n.to_string())
            .zip(self.parameters_mut())
            .collect()
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.embedding];
        params.extend(self.encoder.parameters());
        params.extend(self.projector.parameters());
        params.extend(self.decoder.parameters());
        params
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.embedding];
        params.extend(self.encoder.parameters_mut());
        params.extend(self.projector.parameters_mut());
        params.extend(self.decoder.parameters_mut());
        params
    }

    /// Total number of scalar weights
    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.len()).sum()
    }
}

/// Order matches [`Rvae::parameters`]
const PARAMETER_NAMES: [&str; 15] = [
    "embedding.weight",
    "encoder.lstm.w_ih",
    "encoder.lstm.w_hh",
    "encoder.lstm.bias",
    "latent.mu.weight",
    "latent.mu.bias",
    "latent.logvar.weight",
    "latent.logvar.bias",
    "decoder.latent_to_hidden.weight",
    "decoder.latent_to_hidden.bias",
    "decoder.lstm.w_ih",
    "decoder.lstm.w_hh",
    "decoder.lstm.bias",
    "decoder.output.weight",
    "decoder.output.bias",
];

impl std::fmt::Display for Rvae {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "RVAE(")?;
        for (name, p) in self.named_parameters() {
            writeln!(f, "  {name}: {:?}", p.shape())?;
        }
        write!(f, ")")
    }
}
