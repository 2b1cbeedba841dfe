use std::collections::HashMap;

use ndarray::prelude::*;

use crate::models::DatabaseResult;
use crate::templates::Templates;
use crate::utils::{ActionId, SlotName};

/// Boolean mask over the action space, `true` meaning the action is allowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMask {
    values: Vec<bool>,
}

impl ActionMask {
    pub fn all_allowed(nb_actions: usize) -> Self {
        Self {
            values: vec![true; nb_actions],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_allowed(&self, action_id: ActionId) -> bool {
        self.values.get(action_id).cloned().unwrap_or(false)
    }

    pub fn nothing_allowed(&self) -> bool {
        !self.values.iter().any(|&allowed| allowed)
    }

    pub fn to_array(&self) -> Array1<f32> {
        self.values
            .iter()
            .map(|&allowed| if allowed { 1. } else { 0. })
            .collect()
    }
}

impl From<Vec<bool>> for ActionMask {
    fn from(values: Vec<bool>) -> Self {
        Self { values }
    }
}

pub struct ActionMasker {
    enabled: bool,
}

impl ActionMasker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// An action is allowed when every slot of its template is known, either
    /// from the tracker or from the database result
    pub fn compute_mask(
        &self,
        templates: &Templates,
        tracker_state: &HashMap<SlotName, String>,
        db_result: Option<&DatabaseResult>,
    ) -> ActionMask {
        if !self.enabled {
            return ActionMask::all_allowed(templates.len());
        }
        (0..templates.len())
            .map(|action_id| {
                templates.required_slots(action_id).iter().all(|slot| {
                    tracker_state.contains_key(slot)
                        || db_result.map(|db| db.contains_key(slot)).unwrap_or(false)
                })
            })
            .collect::<Vec<_>>()
            .into()
    }
}
