//! RVAE trainer
//!
//! [`RvaeTrainer`] owns the model, the optimizer and every piece of mutable
//! run state. Training is two-phase:
//!
//! 1. [`RvaeTrainer::run_training`] loops over epochs and returns a
//!    [`FinalModelState`](crate::train::FinalModelState), also when cancelled.
//! 2. [`RvaeTrainer::evaluate`] scores that state on held-out batches.
//!
//! # Example
//!
//! ```no_run
//! use rvae::config::RvaeConfig;
//! use rvae::data::{BatchSource, InMemorySource, Split};
//! use rvae::train::{CancellationToken, RvaeTrainer};
//!
//! # let sentences = vec![vec!["a".to_string()]];
//! let source = InMemorySource::from_tokens(&sentences, &sentences, &sentences, 4, 16);
//! let mut trainer = RvaeTrainer::new(&RvaeConfig::default(), source.vocab().len())?;
//! let final_state = trainer.run_training(&source, &CancellationToken::new())?;
//! let test = trainer.evaluate(&final_state, &source.batches(Split::Test, None))?;
//! println!("test loss {:.2}", test.loss);
//! # Ok::<(), rvae::Error>(())
//! ```

mod core;
mod epoch;
mod step;
mod train_loop;

pub use self::core::RvaeTrainer;
pub use step::StepStats;
