//! Core trainer struct and basic methods

use crate::autograd::Context;
use crate::cli::LogLevel;
use crate::config::{validate_config, RvaeConfig};
use crate::data::{SpecialTokens, Vocab};
use crate::error::Result;
use crate::io::{save_checkpoint, ModelMetadata, ModelState};
use crate::model::Rvae;
use crate::optim::{MultiStepLR, Optimizer, ASGD, SGD};
use crate::train::{Evaluator, RvaeLoss, TrainingState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Orchestrates RVAE training and evaluation
pub struct RvaeTrainer {
    pub(crate) model: Rvae,

    /// SGD until the non-monotone trigger fires, ASGD afterwards
    pub(crate) optimizer: Box<dyn Optimizer>,

    pub(crate) scheduler: MultiStepLR,

    pub(crate) loss: RvaeLoss,

    pub(crate) evaluator: Evaluator,

    pub(crate) config: RvaeConfig,

    /// Dropout masks, word dropout and latent noise during training
    pub(crate) ctx: Context,

    /// Batch order
    pub(crate) shuffle_rng: StdRng,

    pub(crate) state: TrainingState,

    pub(crate) log_level: LogLevel,

    /// Written into checkpoints when known
    pub(crate) vocab: Option<Vec<String>>,
}

impl RvaeTrainer {
    /// Validate `config` and build a freshly initialised model
    ///
    /// The model, the training context, the shuffle order and the evaluator
    /// each get their own generator derived from `training.seed`.
    pub fn new(config: &RvaeConfig, vocab_size: usize) -> Result<Self> {
        validate_config(config)?;
        let training = &config.training;
        let seed = training.seed;
        let pad = SpecialTokens::default().pad;

        let model = Rvae::new(&config.model, vocab_size, seed)?;
        let optimizer = SGD::new(training.lr).with_weight_decay(training.wdecay);

        let mut ctx = Context::new(seed.wrapping_add(1));
        ctx.train();

        Ok(Self {
            model,
            optimizer: Box::new(optimizer),
            scheduler: MultiStepLR::new(training.lr, &training.lr_milestones, training.lr_gamma),
            loss: RvaeLoss::from_config(training, pad),
            evaluator: Evaluator::new(seed.wrapping_add(3), training.deterministic_eval, pad),
            config: config.clone(),
            ctx,
            shuffle_rng: StdRng::seed_from_u64(seed.wrapping_add(2)),
            state: TrainingState::new(training),
            log_level: LogLevel::Normal,
            vocab: None,
        })
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Store the vocabulary alongside the weights in checkpoints
    pub fn with_vocab(mut self, vocab: &Vocab) -> Self {
        self.vocab = Some(vocab.clone().into());
        self
    }

    pub fn model(&self) -> &Rvae {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Rvae {
        &mut self.model
    }

    pub fn config(&self) -> &RvaeConfig {
        &self.config
    }

    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Name of the active optimizer (`sgd` or `asgd`)
    pub fn optimizer_name(&self) -> &'static str {
        self.optimizer.name()
    }

    /// Replace SGD by ASGD at the current learning rate
    ///
    /// Averaging starts from the next step. Calling this twice is a no-op.
    pub fn switch_to_asgd(&mut self) {
        if self.state.asgd_active {
            return;
        }
        let lr = self.optimizer.lr();
        self.optimizer = Box::new(ASGD::new(lr, self.config.training.wdecay));
        self.state.asgd_active = true;
    }

    /// Run `f` with ASGD averages swapped into the model, then restore the
    /// live weights. With SGD the live weights are used unchanged.
    pub(crate) fn with_eval_params<T>(&mut self, f: impl FnOnce(&Self) -> T) -> T {
        let Some(averages) = self.optimizer.eval_params() else {
            return f(self);
        };
        let live: Vec<_> = self
            .model
            .parameters_mut()
            .into_iter()
            .zip(averages)
            .map(|(param, avg)| std::mem::replace(param.data_mut(), avg))
            .collect();
        let out = f(self);
        for (param, data) in self.model.parameters_mut().into_iter().zip(live) {
            *param.data_mut() = data;
        }
        out
    }

    /// Metadata describing the current run
    pub(crate) fn checkpoint_metadata(&self) -> Result<ModelMetadata> {
        let config = serde_json::to_value(&self.config)
            .map_err(|e| crate::Error::Serialization(format!("config serialization failed: {e}")))?;
        let state = serde_json::to_value(&self.state)
            .map_err(|e| crate::Error::Serialization(format!("state serialization failed: {e}")))?;
        let mut metadata = ModelMetadata::new(format!("rvae-{}", self.config.data.dataset))
            .with_training_config(config)
            .with_custom("training_state", state)
            .with_custom("optimizer", serde_json::json!(self.optimizer.name()));
        if let Some(tokens) = &self.vocab {
            metadata = metadata.with_vocab(tokens.clone());
        }
        Ok(metadata)
    }

    /// Write the weights used for evaluation (ASGD averages when active)
    pub fn save_checkpoint(&mut self, path: &Path) -> Result<()> {
        let metadata = self.checkpoint_metadata()?;
        self.with_eval_params(|trainer| {
            save_checkpoint(&ModelState::capture(&trainer.model, metadata), path)
        })
    }
}
