use std::fs::File;
use std::path::Path;

use failure::{format_err, ResultExt};
use log::{info, warn};
use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::action_mask::ActionMask;
use crate::errors::*;
use crate::models::PolicyNetworkConfig;
use crate::utils::{argmax, ActionId};

use super::PolicyNetwork;

const MIN_PROBABILITY: f32 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolicyWeights {
    /// matrix with shape (f, a)
    /// ------------------------
    ///
    /// - f = size of the context vector
    /// - a = number of actions
    weights: Array2<f32>,
    bias: Array1<f32>,
}

/// Linear softmax policy trained with stochastic gradient descent
///
/// Forbidden actions get a null probability, unless the mask forbids every
/// action in which case the unmasked distribution is used.
pub struct SoftmaxPolicyNetwork {
    params: PolicyWeights,
    learning_rate: f32,
}

impl SoftmaxPolicyNetwork {
    pub fn new(input_size: usize, action_size: usize, config: &PolicyNetworkConfig) -> Self {
        Self {
            params: PolicyWeights {
                weights: Array2::zeros((input_size, action_size)),
                bias: Array1::zeros(action_size),
            },
            learning_rate: config.learning_rate,
        }
    }

    fn check_inputs(&self, features: &ArrayView1<f32>, action_mask: &ActionMask) -> Result<()> {
        if features.len() != self.input_size() {
            return Err(HcnError::ShapeMismatch {
                name: "policy network input".to_string(),
                expected: self.input_size(),
                found: features.len(),
            }
            .into());
        }
        if action_mask.len() != self.action_size() {
            return Err(HcnError::ShapeMismatch {
                name: "action mask".to_string(),
                expected: self.action_size(),
                found: action_mask.len(),
            }
            .into());
        }
        Ok(())
    }

    fn probabilities(&self, features: &ArrayView1<f32>, action_mask: &ActionMask) -> Array1<f32> {
        let logits = features.dot(&self.params.weights) + &self.params.bias;
        masked_softmax(&logits, action_mask)
    }
}

fn masked_softmax(logits: &Array1<f32>, action_mask: &ActionMask) -> Array1<f32> {
    let apply_mask = !action_mask.nothing_allowed();
    if !apply_mask {
        warn!("Every action is masked, falling back to the unmasked distribution");
    }
    let is_allowed = |action_id: usize| !apply_mask || action_mask.is_allowed(action_id);
    let max_logit = logits
        .iter()
        .enumerate()
        .filter(|(action_id, _)| is_allowed(*action_id))
        .map(|(_, &logit)| logit)
        .fold(f32::NEG_INFINITY, f32::max);
    let mut probabilities: Array1<f32> = logits
        .iter()
        .enumerate()
        .map(|(action_id, &logit)| {
            if is_allowed(action_id) {
                (logit - max_logit).exp()
            } else {
                0.
            }
        })
        .collect();
    let sum: f32 = probabilities.sum();
    if sum > 0. {
        probabilities /= sum;
    }
    probabilities
}

impl PolicyNetwork for SoftmaxPolicyNetwork {
    fn input_size(&self) -> usize {
        self.params.weights.dim().0
    }

    fn action_size(&self) -> usize {
        self.params.weights.dim().1
    }

    fn train_step(
        &mut self,
        features: &ArrayView1<f32>,
        action_id: ActionId,
        action_mask: &ActionMask,
    ) -> Result<(f32, ActionId)> {
        self.check_inputs(features, action_mask)?;
        if action_id >= self.action_size() {
            return Err(HcnError::UnknownAction(action_id).into());
        }
        let probabilities = self.probabilities(features, action_mask);
        let predicted = argmax(&probabilities.view())
            .ok_or_else(|| format_err!("Cannot predict an action from an empty action space"))?;
        let loss = -probabilities[action_id].max(MIN_PROBABILITY).ln();

        let mut gradient = probabilities;
        gradient[action_id] -= 1.;
        let weights_gradient = features
            .view()
            .insert_axis(Axis(1))
            .dot(&gradient.view().insert_axis(Axis(0)));
        self.params
            .weights
            .scaled_add(-self.learning_rate, &weights_gradient);
        self.params.bias.scaled_add(-self.learning_rate, &gradient);

        Ok((loss, predicted))
    }

    fn forward(
        &mut self,
        features: &ArrayView1<f32>,
        action_mask: &ActionMask,
    ) -> Result<(Array1<f32>, ActionId)> {
        self.check_inputs(features, action_mask)?;
        let probabilities = self.probabilities(features, action_mask);
        let predicted = argmax(&probabilities.view())
            .ok_or_else(|| format_err!("Cannot predict an action from an empty action space"))?;
        Ok((probabilities, predicted))
    }

    fn reset_state(&mut self) {}

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|_| format!("Cannot create policy network file '{:?}'", path))?;
        serde_json::to_writer(file, &self.params)
            .with_context(|_| "Cannot serialize policy network weights")?;
        info!("Policy network saved to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|_| format!("Cannot open policy network file '{:?}'", path))?;
        let params: PolicyWeights = serde_json::from_reader(file)
            .with_context(|_| "Cannot deserialize policy network json data")?;
        if params.weights.dim() != self.params.weights.dim() {
            return Err(HcnError::ShapeMismatch {
                name: "policy network weights".to_string(),
                expected: self.input_size() * self.action_size(),
                found: params.weights.len(),
            }
            .into());
        }
        if params.bias.len() != self.action_size() {
            return Err(HcnError::ShapeMismatch {
                name: "policy network bias".to_string(),
                expected: self.action_size(),
                found: params.bias.len(),
            }
            .into());
        }
        self.params = params;
        info!("Policy network loaded from {:?}", path);
        Ok(())
    }
}
