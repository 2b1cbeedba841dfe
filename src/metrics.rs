use std::fmt;

use ndarray::prelude::*;

use crate::utils::ActionId;

/// Per-pass dialog counters and the (predicted, true) confusion matrix
#[derive(Debug, Clone)]
pub struct DialogMetrics {
    n_actions: usize,
    pub n_examples: usize,
    pub n_dialogs: usize,
    pub n_corr_examples: usize,
    pub train_loss: f32,
    conf_matrix: Array2<u32>,
}

impl DialogMetrics {
    pub fn new(n_actions: usize) -> Self {
        Self {
            n_actions,
            n_examples: 0,
            n_dialogs: 0,
            n_corr_examples: 0,
            train_loss: 0.,
            conf_matrix: Array2::zeros((n_actions, n_actions)),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.n_actions);
    }

    /// Records one prediction
    ///
    /// `text_match` tells whether the decoded response equals the gold one, which
    /// may disagree with `predicted == expected` when two templates render the
    /// same text.
    pub fn record(
        &mut self,
        predicted: ActionId,
        expected: ActionId,
        text_match: bool,
        loss: Option<f32>,
    ) {
        self.n_examples += 1;
        if let Some(loss) = loss {
            self.train_loss += loss;
        }
        if predicted < self.n_actions && expected < self.n_actions {
            self.conf_matrix[(predicted, expected)] += 1;
        }
        if text_match {
            self.n_corr_examples += 1;
        }
    }

    pub fn conf_matrix(&self) -> &Array2<u32> {
        &self.conf_matrix
    }

    pub fn n_corr_actions(&self) -> usize {
        self.conf_matrix.diag().iter().map(|&count| count as usize).sum()
    }

    pub fn accuracy(&self) -> f32 {
        ratio(self.n_corr_examples, self.n_examples)
    }

    pub fn action_accuracy(&self) -> f32 {
        ratio(self.n_corr_actions(), self.n_examples)
    }

    pub fn mean_loss(&self) -> f32 {
        if self.n_examples == 0 {
            0.
        } else {
            self.train_loss / self.n_examples as f32
        }
    }

    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DialogMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "loss = {:.4}, accuracy = {:.4}, action accuracy = {:.4}, examples = {}, dialogs = {}",
            self.mean_loss(),
            self.accuracy(),
            self.action_accuracy(),
            self.n_examples,
            self.n_dialogs
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.
    } else {
        numerator as f32 / denominator as f32
    }
}
