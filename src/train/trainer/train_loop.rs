//! Multi-epoch training loop

use super::core::RvaeTrainer;
use crate::cli::{log, LogLevel};
use crate::data::{BatchSource, Split};
use crate::error::Result;
use crate::train::{Batch, CancellationToken, EvalResult, FinalModelState};
use std::time::Instant;

const RULE_WIDTH: usize = 89;

impl RvaeTrainer {
    /// Train for `training.epochs` epochs or until `cancel` fires
    ///
    /// After every completed epoch the validation split is scored, the
    /// non-monotone ASGD trigger is checked (when enabled) and a checkpoint is
    /// written if validation improved. Cancellation is not an error: the
    /// latest completed state is returned and can still be evaluated.
    pub fn run_training(
        &mut self,
        source: &dyn BatchSource,
        cancel: &CancellationToken,
    ) -> Result<FinalModelState> {
        let valid = source.batches(Split::Valid, None);
        let epochs = self.config.training.epochs;
        let save = self.config.training.save.clone();
        let mut checkpoint = None;
        let mut cancelled = false;

        log(
            self.log_level,
            LogLevel::Verbose,
            &format!(
                "Training on {} ({} train / {} valid sentences)",
                source.name(),
                source.num_sentences(Split::Train),
                source.num_sentences(Split::Valid)
            ),
        );

        for epoch in self.state.epoch + 1..=epochs {
            let epoch_start = Instant::now();
            self.scheduler.set_epoch(epoch);
            self.scheduler.apply(self.optimizer.as_mut());
            if self.scheduler.at_milestone() {
                log(
                    self.log_level,
                    LogLevel::Verbose,
                    &format!("Learning rate decayed to {:.5}", self.optimizer.lr()),
                );
            }
            self.state.annealer.begin_epoch(epoch);

            let stats = self.train_epoch(epoch, source, cancel)?;
            if stats.cancelled {
                cancelled = true;
                log(self.log_level, LogLevel::Normal, &"-".repeat(RULE_WIDTH));
                log(self.log_level, LogLevel::Normal, "Exiting from training early");
                break;
            }
            self.state.epoch = epoch;
            log(
                self.log_level,
                LogLevel::Verbose,
                &format!(
                    "Epoch {epoch}: {} batches, train NLL {:.4}, KL weight {:.4}, optimizer {}",
                    stats.batches,
                    stats.reconstruction,
                    self.state.annealer.coefficient(),
                    self.optimizer.name()
                ),
            );

            let val = self.evaluate_batches(&valid)?;
            log(self.log_level, LogLevel::Normal, &"-".repeat(RULE_WIDTH));
            log(
                self.log_level,
                LogLevel::Normal,
                &format!(
                    "| end of epoch {epoch:3} | time: {:5.2}s | valid loss {:5.2} | valid NLL {:5.2} | valid ppl {:8.2}",
                    epoch_start.elapsed().as_secs_f32(),
                    val.loss,
                    val.nll,
                    val.perplexity()
                ),
            );
            log(self.log_level, LogLevel::Normal, &"-".repeat(RULE_WIDTH));

            if self.config.training.asgd_trigger
                && self.state.should_switch_to_asgd(val.loss, self.config.training.nonmono)
            {
                log(self.log_level, LogLevel::Normal, "Switching to ASGD");
                self.switch_to_asgd();
            }

            if self.state.record_validation(val.loss) {
                if let Some(path) = &save {
                    self.save_checkpoint(path)?;
                    log(
                        self.log_level,
                        LogLevel::Verbose,
                        &format!("Saved checkpoint to {}", path.display()),
                    );
                    checkpoint = Some(path.clone());
                }
            }
        }

        if checkpoint.is_none() {
            if let Some(path) = &save {
                self.save_checkpoint(path)?;
                checkpoint = Some(path.clone());
            }
        }

        Ok(FinalModelState {
            state: self.state.clone(),
            cancelled,
            checkpoint,
        })
    }

    /// Score `batches` with the KL weight the run ended at
    pub fn evaluate(&mut self, final_state: &FinalModelState, batches: &[Batch]) -> Result<EvalResult> {
        let anneal = final_state.anneal();
        self.with_eval_params(|trainer| trainer.evaluator.evaluate(&trainer.model, batches, anneal))
    }

    /// Score `batches` with the current KL weight
    pub(crate) fn evaluate_batches(&mut self, batches: &[Batch]) -> Result<EvalResult> {
        let anneal = self.state.annealer.coefficient();
        self.with_eval_params(|trainer| trainer.evaluator.evaluate(&trainer.model, batches, anneal))
    }
}
