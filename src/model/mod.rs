//! RVAE network
//!
//! A shared embedding feeds an LSTM encoder whose final state parameterises a
//! diagonal Gaussian; a sample from it initialises an LSTM decoder that
//! predicts the sentence under teacher forcing with word dropout.

mod decoder;
mod dropout;
mod embedding;
mod encoder;
mod latent;
mod linear;
mod lstm;
mod rvae;

pub use decoder::{Decoder, DecoderOutput};
pub use dropout::{embedding_row_scale, weight_drop, word_dropout, LockedDropout};
pub use embedding::embed_steps;
pub use encoder::Encoder;
pub use latent::{reparameterize, LatentProjector, Posterior};
pub use linear::Linear;
pub use lstm::{Lstm, LstmOutput, LstmState};
pub use rvae::{Rvae, RvaeOutput};
