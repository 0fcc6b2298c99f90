//! # rvae
//!
//! Recurrent variational autoencoder (RVAE) language model training.
//!
//! The crate trains an LSTM encoder / LSTM decoder pair tied together by a
//! diagonal Gaussian latent code, with:
//!
//! - **Autograd**: tape-based automatic differentiation over `ndarray`
//! - **Model**: shared embedding, weight-dropped LSTMs, latent projector and
//!   reparameterized sampler
//! - **Training**: KL annealing, word dropout, AR/TAR regularization, gradient
//!   clipping, milestone learning-rate decay, SGD → ASGD switching
//! - **Data**: line-per-sentence corpora behind a registry of batch sources
//! - **I/O**: JSON checkpoints and YAML configuration
//!
//! # Example
//!
//! ```no_run
//! use rvae::config::RvaeConfig;
//! use rvae::data::{BatchSource, InMemorySource, Split};
//! use rvae::train::{CancellationToken, RvaeTrainer};
//!
//! let sentences = vec![vec!["the".to_string(), "cat".to_string()]];
//! let source = InMemorySource::from_tokens(&sentences, &sentences, &sentences, 2, 8);
//!
//! let mut config = RvaeConfig::default();
//! config.model.emsize = 8;
//! config.model.nhid = 16;
//! config.training.epochs = 2;
//!
//! let mut trainer = RvaeTrainer::new(&config, source.vocab().len())?;
//! let cancel = CancellationToken::new();
//! let final_state = trainer.run_training(&source, &cancel)?;
//! let test = trainer.evaluate(&final_state, &source.batches(Split::Test, None))?;
//! println!("test ppl {:.2}", test.perplexity());
//! # Ok::<(), rvae::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
