use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::prelude::*;

use crate::action_mask::ActionMask;
use crate::errors::*;
use crate::models::{DialogTurn, Entity, TurnFeatures, TurnInfo};
use crate::ner::{SequenceTagger, TaggerBatch};
use crate::policy::PolicyNetwork;
use crate::utils::{one_hot, ActionId};

pub fn assert_epsilon_eq_array1(a: &Array1<f32>, b: &Array1<f32>, epsilon: f32) {
    assert_eq!(a.dim(), b.dim());
    for (index, elem_a) in a.indexed_iter() {
        assert!(epsilon_eq(*elem_a, b[index], epsilon))
    }
}

pub fn epsilon_eq(a: f32, b: f32, epsilon: f32) -> bool {
    let diff = a - b;
    diff < epsilon && diff > -epsilon
}

pub fn turn_features(
    bow_size: usize,
    bow_index: usize,
    entities: Vec<Entity>,
    embedding_size: usize,
    intents_size: usize,
) -> TurnFeatures {
    TurnFeatures {
        bow: one_hot(bow_size, bow_index).to_vec(),
        emb: vec![0.; embedding_size],
        entities,
        classes: vec![0.; intents_size],
    }
}

pub fn dialog_turn(features: TurnFeatures, response: &str, info: TurnInfo) -> DialogTurn {
    DialogTurn {
        features,
        response: response.to_string(),
        info,
    }
}

#[derive(Debug, Default)]
pub struct PolicyCalls {
    pub features: Vec<Array1<f32>>,
    pub masks: Vec<ActionMask>,
    pub gold_actions: Vec<ActionId>,
    pub resets: usize,
    pub saved: usize,
}

/// Policy network returning scripted predictions and recording every call
pub struct MockedPolicyNetwork {
    input_size: usize,
    action_size: usize,
    predictions: VecDeque<ActionId>,
    calls: Arc<Mutex<PolicyCalls>>,
}

impl MockedPolicyNetwork {
    pub fn new(input_size: usize, action_size: usize) -> Self {
        Self {
            input_size,
            action_size,
            predictions: VecDeque::new(),
            calls: Arc::new(Mutex::new(PolicyCalls::default())),
        }
    }

    pub fn with_predictions(mut self, predictions: Vec<ActionId>) -> Self {
        self.predictions = predictions.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Arc<Mutex<PolicyCalls>> {
        self.calls.clone()
    }

    fn next_prediction(&mut self) -> ActionId {
        self.predictions.pop_front().unwrap_or(0)
    }

    fn record(&self, features: &ArrayView1<f32>, action_mask: &ActionMask) {
        let mut calls = self.calls.lock().unwrap();
        calls.features.push(features.to_owned());
        calls.masks.push(action_mask.clone());
    }
}

impl PolicyNetwork for MockedPolicyNetwork {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn action_size(&self) -> usize {
        self.action_size
    }

    fn train_step(
        &mut self,
        features: &ArrayView1<f32>,
        action_id: ActionId,
        action_mask: &ActionMask,
    ) -> Result<(f32, ActionId)> {
        self.record(features, action_mask);
        self.calls.lock().unwrap().gold_actions.push(action_id);
        Ok((1.0, self.next_prediction()))
    }

    fn forward(
        &mut self,
        features: &ArrayView1<f32>,
        action_mask: &ActionMask,
    ) -> Result<(Array1<f32>, ActionId)> {
        self.record(features, action_mask);
        let prediction = self.next_prediction();
        Ok((one_hot(self.action_size, prediction), prediction))
    }

    fn reset_state(&mut self) {
        self.calls.lock().unwrap().resets += 1;
    }

    fn save(&self, _path: &Path) -> Result<()> {
        self.calls.lock().unwrap().saved += 1;
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Sequence tagger predicting the same tag index for every token
pub struct MockedSequenceTagger {
    pub tag_index: usize,
    pub seen_batches: Arc<Mutex<Vec<TaggerBatch>>>,
}

impl MockedSequenceTagger {
    pub fn new(tag_index: usize) -> Self {
        Self {
            tag_index,
            seen_batches: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl SequenceTagger for MockedSequenceTagger {
    fn predict(&mut self, batch: &TaggerBatch) -> Result<Array2<usize>> {
        self.seen_batches.lock().unwrap().push(batch.clone());
        Ok(Array2::from_elem(batch.tokens.dim(), self.tag_index))
    }

    fn train(&mut self, batch: &TaggerBatch, _tags: &ArrayView2<usize>) -> Result<f32> {
        self.seen_batches.lock().unwrap().push(batch.clone());
        Ok(0.5)
    }

    fn save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
