use std::collections::HashMap;

use log::debug;
use ndarray::prelude::*;

use crate::models::Entity;
use crate::utils::SlotName;

/// Belief state over a fixed slot vocabulary
///
/// The features exposed to the policy are, for each declared slot and in
/// declaration order, a "filled" flag followed (in a second block) by a flag
/// telling whether the last update changed the slot value.
pub struct FeaturizedTracker {
    slot_names: Vec<SlotName>,
    state: HashMap<SlotName, String>,
    updated_slots: Vec<bool>,
}

impl FeaturizedTracker {
    pub fn new(slot_names: Vec<SlotName>) -> Self {
        let nb_slots = slot_names.len();
        Self {
            slot_names,
            state: HashMap::new(),
            updated_slots: vec![false; nb_slots],
        }
    }

    pub fn slot_names(&self) -> &[SlotName] {
        &self.slot_names
    }

    pub fn num_features(&self) -> usize {
        2 * self.slot_names.len()
    }

    pub fn update_state(&mut self, entities: &[Entity]) {
        self.updated_slots.iter_mut().for_each(|flag| *flag = false);
        for entity in entities {
            let slot_index = match self
                .slot_names
                .iter()
                .position(|name| name == &entity.slot_name)
            {
                Some(index) => index,
                None => {
                    debug!("Ignoring unknown slot '{}'", entity.slot_name);
                    continue;
                }
            };
            let previous = self
                .state
                .insert(entity.slot_name.clone(), entity.value.clone());
            if previous.as_ref() != Some(&entity.value) {
                self.updated_slots[slot_index] = true;
            }
        }
    }

    pub fn get_state(&self) -> &HashMap<SlotName, String> {
        &self.state
    }

    pub fn infer(&self) -> Array1<f32> {
        let filled = self
            .slot_names
            .iter()
            .map(|name| if self.state.contains_key(name) { 1. } else { 0. });
        let updated = self
            .updated_slots
            .iter()
            .map(|&flag| if flag { 1. } else { 0. });
        filled.chain(updated).collect()
    }

    pub fn reset_state(&mut self) {
        self.state.clear();
        self.updated_slots.iter_mut().for_each(|flag| *flag = false);
    }
}
