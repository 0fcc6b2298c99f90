//! Training loop
//!
//! This module provides the RVAE training framework:
//! - Time-major sentence batches
//! - The loss assembler (reconstruction, annealed KL, AR and TAR)
//! - KL annealing schedule
//! - Gradient-free evaluation
//! - `RvaeTrainer` with milestone LR decay and the SGD → ASGD trigger
//! - Cooperative cancellation
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
//! let cancel = CancellationToken::new();
//! let final_state = trainer.run_training(&source, &cancel)?;
//! let valid = trainer.evaluate(&final_state, &source.batches(Split::Valid, None))?;
//! println!("valid ppl {:.2}", valid.perplexity());
//! # Ok::<(), rvae::Error>(())
//! ```

mod anneal;
mod batch;
mod cancel;
mod evaluator;
mod loss;
mod state;
mod trainer;


pub use anneal::{AnnealPhase, KlAnnealer};
pub use batch::Batch;
pub use cancel::CancellationToken;
pub use evaluator::{EvalResult, Evaluator};
pub use loss::{LossBreakdown, RvaeLoss};
pub use state::{FinalModelState, TrainingState};
pub use trainer::{RvaeTrainer, StepStats};
