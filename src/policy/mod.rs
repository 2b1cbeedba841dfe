mod softmax_policy;

use std::path::Path;

use ndarray::prelude::*;

use crate::action_mask::ActionMask;
use crate::errors::*;
use crate::utils::ActionId;

pub use self::softmax_policy::SoftmaxPolicyNetwork;

/// Trainable classifier choosing the next action from the encoded dialog context
///
/// Implementations must always return an action, including when the mask
/// forbids every action.
pub trait PolicyNetwork: Send {
    fn input_size(&self) -> usize;

    fn action_size(&self) -> usize;

    /// Supervised step against the gold action, returns the loss and the
    /// action predicted before the update
    fn train_step(
        &mut self,
        features: &ArrayView1<f32>,
        action_id: ActionId,
        action_mask: &ActionMask,
    ) -> Result<(f32, ActionId)>;

    fn forward(
        &mut self,
        features: &ArrayView1<f32>,
        action_mask: &ActionMask,
    ) -> Result<(Array1<f32>, ActionId)>;

    /// Clears any per-episode state
    fn reset_state(&mut self);

    fn save(&self, path: &Path) -> Result<()>;

    fn load(&mut self, path: &Path) -> Result<()>;
}
