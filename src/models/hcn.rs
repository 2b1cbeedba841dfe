use serde_derive::Deserialize;

use crate::utils::SlotName;

#[derive(Debug, Clone, Deserialize)]
pub struct HcnConfig {
    pub slot_names: Vec<SlotName>,
    pub template_path: String,
    #[serde(default)]
    pub use_action_mask: bool,
    pub bow_size: usize,
    pub embedding_size: usize,
    pub intents_size: usize,
    #[serde(default)]
    pub network: PolicyNetworkConfig,
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub save_to: Option<String>,
    #[serde(default = "default_num_epochs")]
    pub num_epochs: usize,
    #[serde(default = "default_val_patience")]
    pub val_patience: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyNetworkConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
}

impl Default for PolicyNetworkConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
        }
    }
}

fn default_num_epochs() -> usize {
    100
}

fn default_val_patience() -> usize {
    5
}

fn default_learning_rate() -> f32 {
    0.1
}
