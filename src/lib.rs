mod action_mask;
pub mod errors;
mod hcn_bot;
mod metrics;
pub mod models;
pub mod ner;
pub mod pipeline;
pub mod policy;
mod slot_tracker;
mod templates;
#[cfg(test)]
mod testutils;
mod trainer;
mod utils;

pub use crate::action_mask::{ActionMask, ActionMasker};
pub use crate::errors::*;
pub use crate::hcn_bot::{BotAction, HybridCodeNetworkBot};
pub use crate::metrics::DialogMetrics;
pub use crate::models::*;
pub use crate::ner::{NerTagger, SequenceTagger};
pub use crate::pipeline::{Component, Pipeline, TurnContext};
pub use crate::policy::{PolicyNetwork, SoftmaxPolicyNetwork};
pub use crate::slot_tracker::FeaturizedTracker;
pub use crate::templates::{Template, Templates};
pub use crate::trainer::{Trainer, TrainingSummary};
pub use crate::utils::{ActionId, SlotName};
