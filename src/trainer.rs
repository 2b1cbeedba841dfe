use log::info;

use crate::errors::*;
use crate::hcn_bot::HybridCodeNetworkBot;
use crate::metrics::DialogMetrics;
use crate::models::{DialogTurn, HcnConfig};

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub early_stopped: bool,
    pub train_metrics: DialogMetrics,
    pub valid_metrics: Option<DialogMetrics>,
}

/// Epoch loop with early stopping on validation action accuracy
pub struct Trainer {
    num_epochs: usize,
    val_patience: usize,
}

impl Trainer {
    pub fn new(num_epochs: usize, val_patience: usize) -> Self {
        Self {
            num_epochs,
            val_patience,
        }
    }

    pub fn from_config(config: &HcnConfig) -> Self {
        Self::new(config.num_epochs, config.val_patience)
    }

    /// Trains the bot and saves it once done
    ///
    /// The patience counter decreases each time validation action accuracy gets
    /// lower than at the previous epoch and is restored otherwise. Training stops
    /// when it reaches zero.
    pub fn train(
        &self,
        bot: &mut HybridCodeNetworkBot,
        train_turns: &[DialogTurn],
        valid_turns: &[DialogTurn],
    ) -> Result<TrainingSummary> {
        info!("Training started");
        let mut curr_patience = self.val_patience;
        let mut prev_valid_accuracy = 0.;
        let mut summary = TrainingSummary {
            epochs: 0,
            early_stopped: false,
            train_metrics: bot.metrics().clone(),
            valid_metrics: None,
        };

        for epoch in 1..=self.num_epochs {
            bot.reset();
            bot.reset_metrics();
            for turn in train_turns {
                bot.train_on_batch(&turn.features, &turn.response, &turn.info)?;
            }
            info!("{}.train {}", epoch, bot.report());
            summary.epochs = epoch;
            summary.train_metrics = bot.metrics().clone();

            if valid_turns.is_empty() {
                continue;
            }
            let valid_metrics = bot.evaluate(valid_turns)?;
            info!("{}.valid {}", epoch, valid_metrics.report());
            let valid_accuracy = valid_metrics.action_accuracy();
            summary.valid_metrics = Some(valid_metrics);

            if prev_valid_accuracy > valid_accuracy {
                curr_patience = curr_patience.saturating_sub(1);
                info!("Patience decreased by 1, is equal to {}", curr_patience);
            } else {
                curr_patience = self.val_patience;
            }
            if curr_patience < 1 {
                info!("Patience is over, stopped training");
                summary.early_stopped = true;
                break;
            }
            prev_valid_accuracy = valid_accuracy;
        }
        if !summary.early_stopped {
            info!("Stopping because max number of epochs encountered");
        }
        bot.save()?;
        Ok(summary)
    }
}
