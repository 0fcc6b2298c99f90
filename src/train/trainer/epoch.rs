//! Epoch-level training

use super::core::RvaeTrainer;
use crate::cli::{log, LogLevel};
use crate::data::{BatchSource, Split};
use crate::error::Result;
use crate::train::CancellationToken;
use std::time::Instant;

/// Summary of one pass over the training split
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct EpochStats {
    /// Batch-averaged reconstruction loss
    pub reconstruction: f32,
    pub batches: usize,
    pub cancelled: bool,
}

impl RvaeTrainer {
    /// Train for one epoch over freshly shuffled batches
    ///
    /// Cancellation is checked before every batch; a cancelled epoch reports
    /// the batches finished so far.
    pub(crate) fn train_epoch(
        &mut self,
        epoch: usize,
        source: &dyn BatchSource,
        cancel: &CancellationToken,
    ) -> Result<EpochStats> {
        let batches = source.batches(Split::Train, Some(&mut self.shuffle_rng));
        let total = batches.len();
        let log_interval = self.config.training.log_interval.max(1);

        let mut stats = EpochStats::default();
        let mut interval_loss = 0.0f32;
        let mut epoch_loss = 0.0f32;
        let mut interval_start = Instant::now();

        for (i, batch) in batches.iter().enumerate() {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            let step = self.train_step(batch)?;
            interval_loss += step.reconstruction;
            epoch_loss += step.reconstruction;
            stats.batches += 1;

            if (i + 1) % log_interval == 0 {
                let cur_loss = interval_loss / log_interval as f32;
                let ms_per_batch = interval_start.elapsed().as_secs_f32() * 1000.0 / log_interval as f32;
                log(
                    self.log_level,
                    LogLevel::Normal,
                    &format!(
                        "| epoch {epoch:3} | {:5}/{total:5} batches | lr {:05.5} | ms/batch {ms_per_batch:5.2} | loss {cur_loss:5.2} | ppl {:8.2} | kl {:5.3} | anneal {:.4}",
                        i + 1,
                        self.optimizer.lr(),
                        cur_loss.exp(),
                        step.kl,
                        step.anneal,
                    ),
                );
                interval_loss = 0.0;
                interval_start = Instant::now();
            }
        }

        if stats.batches > 0 {
            stats.reconstruction = epoch_loss / stats.batches as f32;
        }
        Ok(stats)
    }
}
