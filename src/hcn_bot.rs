use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use failure::ResultExt;
use log::{debug, info, warn};
use ndarray::prelude::*;
use ndarray::{aview1, concatenate};

use crate::action_mask::{ActionMask, ActionMasker};
use crate::errors::*;
use crate::metrics::DialogMetrics;
use crate::models::{DatabaseResult, DialogTurn, HcnConfig, TurnFeatures, TurnInfo};
use crate::policy::{PolicyNetwork, SoftmaxPolicyNetwork};
use crate::slot_tracker::FeaturizedTracker;
use crate::templates::Templates;
use crate::utils::{extract_model_zip_archive, one_hot, ActionId, SlotName};

/// Database flags: result of the current turn is empty, cached result was empty
const NB_CONTEXT_FEATURES: usize = 2;

/// Action chosen by the bot for a user turn
#[derive(Debug, Clone, PartialEq)]
pub struct BotAction {
    pub action_id: ActionId,
    pub act: String,
    pub text: String,
    pub probabilities: Array1<f32>,
}

/// Hybrid Code Network dialog controller
///
/// Dialog state (belief state, database result and previous action) is carried
/// from one turn to the next and cleared when a turn starts a new episode.
pub struct HybridCodeNetworkBot {
    tracker: FeaturizedTracker,
    templates: Templates,
    action_masker: ActionMasker,
    network: Box<dyn PolicyNetwork>,
    db_result: Option<DatabaseResult>,
    prev_action: Array1<f32>,
    metrics: DialogMetrics,
    bow_size: usize,
    embedding_size: usize,
    intents_size: usize,
    save_to: Option<PathBuf>,
}

impl HybridCodeNetworkBot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().join("hcn.json");
        let config_file = File::open(&config_path)
            .with_context(|_| HcnError::ModelLoad(format!("{:?}", config_path)))?;
        let config: HcnConfig = serde_json::from_reader(config_file)
            .with_context(|_| format!("Invalid hcn config file {:?}", &config_path))?;

        let templates = Templates::from_path(path.as_ref().join(&config.template_path))?;
        let input_size = observation_size(&config, templates.len());
        let mut network =
            SoftmaxPolicyNetwork::new(input_size, templates.len(), &config.network);
        if let Some(weights_name) = config.load.as_ref() {
            let weights_path = path.as_ref().join(weights_name);
            if weights_path.exists() {
                network.load(&weights_path)?;
            } else {
                info!(
                    "No policy weights found at {:?}, starting from scratch",
                    weights_path
                );
            }
        }

        let mut bot = Self::new(&config, templates, Box::new(network))?;
        bot.save_to = config.save_to.as_ref().map(|name| path.as_ref().join(name));
        Ok(bot)
    }

    /// Loads a bot from a zipped directory, weights are loaded in memory and
    /// the extracted files are discarded
    pub fn from_zip<R: io::Read + io::Seek>(reader: R) -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("temp_dir_hcn_").tempdir()?;
        let bot_dir_path = extract_model_zip_archive(reader, temp_dir.path())?;
        let mut bot = Self::from_path(bot_dir_path)?;
        bot.save_to = None;
        Ok(bot)
    }

    pub fn new(
        config: &HcnConfig,
        templates: Templates,
        network: Box<dyn PolicyNetwork>,
    ) -> Result<Self> {
        let n_actions = templates.len();
        if network.action_size() != n_actions {
            return Err(HcnError::ShapeMismatch {
                name: "action space".to_string(),
                expected: n_actions,
                found: network.action_size(),
            }
            .into());
        }
        let input_size = observation_size(config, n_actions);
        if network.input_size() != input_size {
            return Err(HcnError::ShapeMismatch {
                name: "context vector".to_string(),
                expected: input_size,
                found: network.input_size(),
            }
            .into());
        }

        Ok(Self {
            tracker: FeaturizedTracker::new(config.slot_names.clone()),
            templates,
            action_masker: ActionMasker::new(config.use_action_mask),
            network,
            db_result: None,
            prev_action: Array1::zeros(n_actions),
            metrics: DialogMetrics::new(n_actions),
            bow_size: config.bow_size,
            embedding_size: config.embedding_size,
            intents_size: config.intents_size,
            save_to: None,
        })
    }
}

fn observation_size(config: &HcnConfig, n_actions: usize) -> usize {
    config.bow_size
        + config.embedding_size
        + config.intents_size
        + 2 * config.slot_names.len()
        + NB_CONTEXT_FEATURES
        + n_actions
}

impl HybridCodeNetworkBot {
    pub fn n_actions(&self) -> usize {
        self.templates.len()
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn belief_state(&self) -> &HashMap<SlotName, String> {
        self.tracker.get_state()
    }

    pub fn db_result(&self) -> Option<&DatabaseResult> {
        self.db_result.as_ref()
    }

    pub fn previous_action(&self) -> &Array1<f32> {
        &self.prev_action
    }

    pub fn metrics(&self) -> &DialogMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    pub fn report(&self) -> String {
        self.metrics.report()
    }
}

impl HybridCodeNetworkBot {
    /// Supervised step on a single turn, returns the loss
    pub fn train_on_batch(
        &mut self,
        features: &TurnFeatures,
        response: &str,
        info: &TurnInfo,
    ) -> Result<f32> {
        let action_id = self.templates.action_id_of(response, &info.act)?;
        self.check_features(features)?;
        if info.episode_done {
            self.reset();
            self.metrics.n_dialogs += 1;
        }
        let db_was_empty = self.update_db_result(info.db_result.as_ref());

        let context = self.encode_context(features, info.db_result.as_ref(), db_was_empty)?;
        let action_mask = self.action_mask();
        let (loss, pred_id) = self
            .network
            .train_step(&context.view(), action_id, &action_mask)?;
        self.check_action(pred_id)?;
        self.set_prev_action(pred_id);

        let pred_text = self.decode_response(pred_id)?;
        let text_match = same_text(&pred_text, response);
        if text_match != (pred_id == action_id) {
            debug!(
                "Slot filling problem: predicted {} '{}', expected {} '{}', state {:?}, db_result {:?}",
                pred_id,
                pred_text,
                action_id,
                response,
                self.tracker.get_state(),
                self.db_result
            );
        }
        self.metrics
            .record(pred_id, action_id, text_match, Some(loss));
        Ok(loss)
    }

    pub fn infer_on_batch(
        &mut self,
        features: &TurnFeatures,
        db_result: Option<DatabaseResult>,
    ) -> Result<BotAction> {
        self.check_features(features)?;
        let db_was_empty = self.update_db_result(db_result.as_ref());
        let context = self.encode_context(features, db_result.as_ref(), db_was_empty)?;
        let action_mask = self.action_mask();
        let (probabilities, pred_id) = self.network.forward(&context.view(), &action_mask)?;
        self.check_action(pred_id)?;
        self.set_prev_action(pred_id);

        let text = self.decode_response(pred_id)?;
        let act = self.templates.get(pred_id).map(|t| t.act()).unwrap_or("");
        Ok(BotAction {
            action_id: pred_id,
            act: act.to_string(),
            text,
            probabilities,
        })
    }

    /// Runs inference over labeled turns and gathers metrics in a fresh
    /// accumulator, the training metrics are left untouched
    pub fn evaluate<'a, I>(&mut self, turns: I) -> Result<DialogMetrics>
    where
        I: IntoIterator<Item = &'a DialogTurn>,
    {
        let mut metrics = DialogMetrics::new(self.n_actions());
        self.reset();
        for turn in turns {
            if turn.info.episode_done {
                self.reset();
                metrics.n_dialogs += 1;
            }
            let action_id = self
                .templates
                .action_id_of(&turn.response, &turn.info.act)?;
            let action = self.infer_on_batch(&turn.features, turn.info.db_result.clone())?;
            let text_match = same_text(&action.text, &turn.response);
            metrics.record(action.action_id, action_id, text_match, None);
        }
        Ok(metrics)
    }

    pub fn reset(&mut self) {
        self.tracker.reset_state();
        self.db_result = None;
        self.prev_action.fill(0.);
        self.network.reset_state();
    }

    /// Saves the policy weights to the configured destination, if any
    pub fn save(&self) -> Result<()> {
        match self.save_to.as_ref() {
            Some(path) => self.network.save(path),
            None => {
                warn!("No destination configured, policy network not saved");
                Ok(())
            }
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.network.save(path.as_ref())
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.network.load(path.as_ref())
    }
}

impl HybridCodeNetworkBot {
    /// Stores the new database result if any, and tells whether the previous
    /// one was an empty result
    fn update_db_result(&mut self, db_result: Option<&DatabaseResult>) -> bool {
        let was_empty = self
            .db_result
            .as_ref()
            .map(|db| db.is_empty())
            .unwrap_or(false);
        if let Some(db_result) = db_result {
            self.db_result = Some(db_result.clone());
        }
        was_empty
    }

    fn check_features(&self, features: &TurnFeatures) -> Result<()> {
        check_len("bag of words", self.bow_size, features.bow.len())?;
        check_len("embedding", self.embedding_size, features.emb.len())?;
        check_len("intent classes", self.intents_size, features.classes.len())
    }

    fn encode_context(
        &mut self,
        features: &TurnFeatures,
        turn_db_result: Option<&DatabaseResult>,
        db_was_empty: bool,
    ) -> Result<Array1<f32>> {
        self.tracker.update_state(&features.entities);
        let state_features = self.tracker.infer();

        let db_is_empty = turn_db_result.map(|db| db.is_empty()).unwrap_or(false);
        let context_features = arr1(&[flag(db_is_empty), flag(db_was_empty)]);

        Ok(concatenate(
            Axis(0),
            &[
                aview1(&features.bow),
                aview1(&features.emb),
                aview1(&features.classes),
                state_features.view(),
                context_features.view(),
                self.prev_action.view(),
            ],
        )?)
    }

    fn action_mask(&self) -> ActionMask {
        self.action_masker.compute_mask(
            &self.templates,
            self.tracker.get_state(),
            self.db_result.as_ref(),
        )
    }

    /// Renders the template of the action with the tracked slots, database
    /// values taking precedence
    fn decode_response(&self, action_id: ActionId) -> Result<String> {
        let mut slots = self.tracker.get_state().clone();
        if let Some(db_result) = self.db_result.as_ref() {
            slots.extend(db_result.slot_values());
        }
        self.templates.render(action_id, &slots)
    }

    fn check_action(&self, action_id: ActionId) -> Result<()> {
        if action_id >= self.n_actions() {
            return Err(HcnError::UnknownAction(action_id).into());
        }
        Ok(())
    }

    fn set_prev_action(&mut self, action_id: ActionId) {
        self.prev_action = one_hot(self.n_actions(), action_id);
    }
}

fn check_len(name: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(HcnError::ShapeMismatch {
            name: name.to_string(),
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

fn flag(value: bool) -> f32 {
    if value {
        1.
    } else {
        0.
    }
}

fn same_text(predicted: &str, expected: &str) -> bool {
    predicted.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, PolicyNetworkConfig};
    use crate::templates::Template;
    use crate::testutils::*;
    use ndarray::{array, s};
    use std::io::Write;

    const BOW_SIZE: usize = 4;
    const EMBEDDING_SIZE: usize = 2;
    const INTENTS_SIZE: usize = 2;

    fn config(use_action_mask: bool) -> HcnConfig {
        HcnConfig {
            slot_names: vec!["area".to_string(), "food".to_string(), "price".to_string()],
            template_path: "templates.txt".to_string(),
            use_action_mask,
            bow_size: BOW_SIZE,
            embedding_size: EMBEDDING_SIZE,
            intents_size: INTENTS_SIZE,
            network: PolicyNetworkConfig::default(),
            load: None,
            save_to: None,
            num_epochs: 10,
            val_patience: 5,
        }
    }

    fn templates() -> Templates {
        Templates::new(vec![
            Template::new("inform", "there is a #food restaurant in #area", None).unwrap(),
            Template::new("request_area", "What part of town do you have in mind?", None)
                .unwrap(),
            Template::new("bye", "Goodbye.", None).unwrap(),
        ])
    }

    // 4 + 2 + 2 + 2 * 3 + 2 + 3
    const INPUT_SIZE: usize = 19;

    fn bot_with_mock(
        use_action_mask: bool,
        predictions: Vec<ActionId>,
    ) -> (
        HybridCodeNetworkBot,
        std::sync::Arc<std::sync::Mutex<PolicyCalls>>,
    ) {
        let network = MockedPolicyNetwork::new(INPUT_SIZE, 3).with_predictions(predictions);
        let calls = network.calls();
        let bot =
            HybridCodeNetworkBot::new(&config(use_action_mask), templates(), Box::new(network))
                .unwrap();
        (bot, calls)
    }

    fn features(bow_index: usize, entities: Vec<Entity>) -> TurnFeatures {
        turn_features(BOW_SIZE, bow_index, entities, EMBEDDING_SIZE, INTENTS_SIZE)
    }

    #[test]
    fn test_new_fails_on_context_size_mismatch() {
        // Given
        let network = MockedPolicyNetwork::new(INPUT_SIZE + 1, 3);

        // When
        let result = HybridCodeNetworkBot::new(&config(false), templates(), Box::new(network));

        // Then
        let error = result.err().unwrap();
        match error.downcast_ref::<HcnError>() {
            Some(HcnError::ShapeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(INPUT_SIZE, *expected);
                assert_eq!(INPUT_SIZE + 1, *found);
            }
            _ => panic!("Unexpected error: {}", error),
        }
    }

    #[test]
    fn test_new_fails_on_action_space_mismatch() {
        let network = MockedPolicyNetwork::new(INPUT_SIZE, 2);
        let result = HybridCodeNetworkBot::new(&config(false), templates(), Box::new(network));
        assert!(result.is_err());
    }

    #[test]
    fn test_context_vector_layout() {
        // Given
        let (mut bot, calls) = bot_with_mock(false, vec![1, 2]);
        let mut first_features = features(2, vec![Entity::new("food", "italian")]);
        first_features.emb = vec![0.3, -0.3];
        first_features.classes = vec![0.9, 0.1];

        // When
        bot.infer_on_batch(&first_features, Some(DatabaseResult::empty()))
            .unwrap();
        bot.infer_on_batch(&features(0, vec![]), None).unwrap();

        // Then
        let calls = calls.lock().unwrap();
        assert_eq!(
            array![
                0f32, 0., 1., 0., // bow
                0.3, -0.3, // embedding
                0.9, 0.1, // intent classes
                0., 1., 0., 0., 1., 0., // slots filled, slots updated
                1., 0., // db result empty now, db result empty before
                0., 0., 0. // previous action
            ],
            calls.features[0]
        );
        assert_eq!(array![0f32, 1.], calls.features[1].slice(s![14..16]));
        assert_eq!(array![0f32, 1., 0.], calls.features[1].slice(s![16..]));
    }

    #[test]
    fn test_mask_scenario() {
        // Given
        let (mut bot, calls) = bot_with_mock(true, vec![1, 0]);

        // When
        bot.infer_on_batch(
            &features(0, vec![Entity::new("food", "italian")]),
            Some(DatabaseResult::empty()),
        )
        .unwrap();
        let action = bot
            .infer_on_batch(
                &features(1, vec![Entity::new("area", "north")]),
                Some(DatabaseResult::empty()),
            )
            .unwrap();

        // Then
        let calls = calls.lock().unwrap();
        assert_eq!(Some(&DatabaseResult::empty()), bot.db_result());
        assert!(!calls.masks[0].is_allowed(0));
        assert!(calls.masks[0].is_allowed(1));
        assert!(calls.masks[1].is_allowed(0));
        assert_eq!(0, action.action_id);
        assert_eq!("inform", action.act);
        assert_eq!("there is a italian restaurant in north", action.text);
    }

    #[test]
    fn test_decoded_response_prefers_database_values() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![0]);
        let db_result: DatabaseResult = vec![("area", "centre")].into_iter().collect();

        // When
        let action = bot
            .infer_on_batch(
                &features(
                    0,
                    vec![Entity::new("food", "thai"), Entity::new("area", "north")],
                ),
                Some(db_result),
            )
            .unwrap();

        // Then
        assert_eq!("there is a thai restaurant in centre", action.text);
    }

    #[test]
    fn test_previous_action_is_one_hot() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![2, 1]);

        // When
        bot.infer_on_batch(&features(0, vec![]), None).unwrap();
        let after_infer = bot.previous_action().clone();
        bot.train_on_batch(
            &features(1, vec![]),
            "What part of town do you have in mind?",
            &TurnInfo::new("request_area"),
        )
        .unwrap();
        let after_train = bot.previous_action().clone();

        // Then
        assert_eq!(array![0f32, 0., 1.], after_infer);
        assert_eq!(array![0f32, 1., 0.], after_train);
    }

    #[test]
    fn test_episode_reset() {
        // Given
        let (mut bot, calls) = bot_with_mock(false, vec![1, 0, 2]);
        let db_result: DatabaseResult = vec![("name", "pizza hut")].into_iter().collect();

        // When
        bot.train_on_batch(
            &features(0, vec![Entity::new("food", "italian")]),
            "What part of town do you have in mind?",
            &TurnInfo::new("request_area").episode_done(),
        )
        .unwrap();
        bot.train_on_batch(
            &features(1, vec![Entity::new("area", "north")]),
            "there is a italian restaurant in north",
            &TurnInfo::new("inform").with_db_result(db_result),
        )
        .unwrap();
        bot.train_on_batch(
            &features(2, vec![Entity::new("price", "cheap")]),
            "Goodbye.",
            &TurnInfo::new("bye").episode_done(),
        )
        .unwrap();

        // Then
        let calls = calls.lock().unwrap();
        let third_turn = &calls.features[2];
        assert_eq!(array![0f32, 0., 1., 0., 0., 1.], third_turn.slice(s![8..14]));
        assert_eq!(array![0f32, 0.], third_turn.slice(s![14..16]));
        assert_eq!(array![0f32, 0., 0.], third_turn.slice(s![16..]));
        assert_eq!(1, bot.belief_state().len());
        assert_eq!(Some(&"cheap".to_string()), bot.belief_state().get("price"));
        assert_eq!(None, bot.db_result());
        assert_eq!(array![0f32, 0., 1.], *bot.previous_action());
        assert_eq!(2, calls.resets);
        assert_eq!(vec![1, 0, 2], calls.gold_actions);
    }

    #[test]
    fn test_dialog_counter() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![]);
        let infos = vec![
            TurnInfo::new("bye").episode_done(),
            TurnInfo::new("bye"),
            TurnInfo::new("bye").episode_done(),
        ];

        // When
        for info in infos.iter() {
            bot.train_on_batch(&features(0, vec![]), "Goodbye.", info)
                .unwrap();
        }

        // Then
        assert_eq!(2, bot.metrics().n_dialogs);
        assert_eq!(3, bot.metrics().n_examples);
    }

    #[test]
    fn test_db_result_is_carried_over_within_episode() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![]);
        let db_result: DatabaseResult = vec![("name", "pizza hut")].into_iter().collect();

        // When
        bot.infer_on_batch(&features(0, vec![]), Some(db_result.clone()))
            .unwrap();
        bot.infer_on_batch(&features(1, vec![]), None).unwrap();

        // Then
        assert_eq!(Some(&db_result), bot.db_result());
    }

    #[test]
    fn test_unknown_template_is_fatal() {
        // Given
        let (mut bot, calls) = bot_with_mock(false, vec![]);

        // When
        let result = bot.train_on_batch(
            &features(0, vec![]),
            "Thank you, goodbye.",
            &TurnInfo::new("thankyou"),
        );

        // Then
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<HcnError>(),
            Some(HcnError::TemplateNotFound { .. })
        ));
        assert!(calls.lock().unwrap().features.is_empty());
    }

    #[test]
    fn test_failed_training_turn_leaves_state_untouched() {
        // Given
        let (mut bot, calls) = bot_with_mock(false, vec![]);
        let db_result: DatabaseResult = vec![("name", "pizza hut")].into_iter().collect();
        bot.infer_on_batch(
            &features(0, vec![Entity::new("food", "thai")]),
            Some(db_result.clone()),
        )
        .unwrap();
        let previous_action = bot.previous_action().clone();

        // When
        let result = bot.train_on_batch(
            &features(1, vec![Entity::new("area", "west")]),
            "Thank you, goodbye.",
            &TurnInfo::new("thankyou")
                .episode_done()
                .with_db_result(DatabaseResult::empty()),
        );

        // Then
        assert!(result.is_err());
        assert_eq!(Some(&db_result), bot.db_result());
        assert_eq!(1, bot.belief_state().len());
        assert_eq!(Some(&"thai".to_string()), bot.belief_state().get("food"));
        assert_eq!(previous_action, *bot.previous_action());
        assert_eq!(0, bot.metrics().n_dialogs);
        assert_eq!(0, bot.metrics().n_examples);
        assert_eq!(0, calls.lock().unwrap().resets);
    }

    #[test]
    fn test_wrong_feature_size_fails() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![]);
        let db_result: DatabaseResult = vec![("name", "pizza hut")].into_iter().collect();
        bot.infer_on_batch(&features(0, vec![]), Some(db_result.clone()))
            .unwrap();
        let mut features = features(1, vec![Entity::new("food", "thai")]);
        features.bow.push(0.);

        // When
        let result = bot.infer_on_batch(&features, Some(DatabaseResult::empty()));

        // Then
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<HcnError>(),
            Some(HcnError::ShapeMismatch { .. })
        ));
        assert_eq!(Some(&db_result), bot.db_result());
        assert!(bot.belief_state().is_empty());
    }

    #[test]
    fn test_correctness_criteria_may_disagree() {
        // Given
        let templates = Templates::new(vec![
            Template::new("confirm_food", "Sure.", None).unwrap(),
            Template::new("confirm_area", "Sure.", None).unwrap(),
            Template::new("bye", "Goodbye.", None).unwrap(),
        ]);
        let network = MockedPolicyNetwork::new(INPUT_SIZE, 3).with_predictions(vec![0]);
        let mut bot =
            HybridCodeNetworkBot::new(&config(false), templates, Box::new(network)).unwrap();

        // When
        bot.train_on_batch(&features(0, vec![]), "sure.", &TurnInfo::new("confirm_area"))
            .unwrap();

        // Then
        let metrics = bot.metrics();
        assert_eq!(1, metrics.conf_matrix()[(0, 1)]);
        assert_eq!(1, metrics.n_corr_examples);
        assert_eq!(0, metrics.n_corr_actions());
    }

    #[test]
    fn test_evaluate_does_not_touch_training_metrics() {
        // Given
        let (mut bot, _) = bot_with_mock(false, vec![2, 2, 1]);
        bot.train_on_batch(
            &features(0, vec![]),
            "Goodbye.",
            &TurnInfo::new("bye").episode_done(),
        )
        .unwrap();
        let turns = vec![
            dialog_turn(
                features(0, vec![]),
                "Goodbye.",
                TurnInfo::new("bye").episode_done(),
            ),
            dialog_turn(
                features(1, vec![]),
                "Goodbye.",
                TurnInfo::new("bye"),
            ),
        ];

        // When
        let metrics = bot.evaluate(&turns).unwrap();

        // Then
        assert_eq!(2, metrics.n_examples);
        assert_eq!(1, metrics.n_dialogs);
        assert_eq!(1, metrics.n_corr_actions());
        assert_eq!(0., metrics.train_loss);
        assert_eq!(1, bot.metrics().n_examples);
        assert_eq!(1, bot.metrics().n_dialogs);
    }

    #[test]
    fn test_from_path() {
        // Given
        let bot_path = Path::new("data").join("tests").join("hcn");

        // When
        let mut bot = HybridCodeNetworkBot::from_path(bot_path).unwrap();
        let action = bot
            .infer_on_batch(
                &turn_features(6, 0, vec![Entity::new("food", "italian")], 3, 3),
                None,
            )
            .unwrap();

        // Then
        assert_eq!(5, bot.n_actions());
        assert_eq!(5, action.probabilities.len());
        assert_eq!(Some(&"italian".to_string()), bot.belief_state().get("food"));
    }

    #[test]
    fn test_from_zip() {
        // Given
        let bot_path = Path::new("data").join("tests").join("hcn");
        let mut zip_data = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut zip_data);
            let options = zip::write::FileOptions::default();
            for file_name in &["hcn.json", "templates.txt"] {
                let content = std::fs::read(bot_path.join(file_name)).unwrap();
                writer
                    .start_file(format!("hcn/{}", file_name), options)
                    .unwrap();
                writer.write_all(&content).unwrap();
            }
            writer.finish().unwrap();
        }
        zip_data.set_position(0);

        // When
        let bot = HybridCodeNetworkBot::from_zip(zip_data).unwrap();

        // Then
        assert_eq!(5, bot.n_actions());
    }

    #[test]
    fn test_save_uses_configured_destination() {
        // Given
        let (bot, calls) = bot_with_mock(false, vec![]);

        // When
        bot.save().unwrap();
        bot.save_to_path("unused").unwrap();

        // Then
        assert_eq!(1, calls.lock().unwrap().saved);
    }
}
