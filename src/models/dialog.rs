use std::collections::HashMap;
use std::iter::FromIterator;

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::SlotName;

/// A slot value extracted from the user utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub slot_name: SlotName,
    pub value: String,
}

impl Entity {
    pub fn new<S: Into<String>, V: Into<String>>(slot_name: S, value: V) -> Self {
        Self {
            slot_name: slot_name.into(),
            value: value.into(),
        }
    }
}

/// Outcome of an external database lookup, keyed by slot-like names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseResult(HashMap<String, Value>);

impl DatabaseResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Values are rendered as plain strings, non-string JSON values use their
    /// JSON representation
    pub fn slot_values(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl From<HashMap<String, Value>> for DatabaseResult {
    fn from(values: HashMap<String, Value>) -> Self {
        DatabaseResult(values)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DatabaseResult {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        DatabaseResult(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// Features produced upstream for a single user turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnFeatures {
    pub bow: Vec<f32>,
    pub emb: Vec<f32>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    pub classes: Vec<f32>,
}

/// Dialog-level annotations attached to a turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub act: String,
    #[serde(default)]
    pub episode_done: bool,
    #[serde(default)]
    pub db_result: Option<DatabaseResult>,
}

impl TurnInfo {
    pub fn new<S: Into<String>>(act: S) -> Self {
        Self {
            act: act.into(),
            episode_done: false,
            db_result: None,
        }
    }

    pub fn episode_done(mut self) -> Self {
        self.episode_done = true;
        self
    }

    pub fn with_db_result(mut self, db_result: DatabaseResult) -> Self {
        self.db_result = Some(db_result);
        self
    }
}

/// A labeled turn as consumed by training and evaluation loops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogTurn {
    pub features: TurnFeatures,
    pub response: String,
    #[serde(rename = "other")]
    pub info: TurnInfo,
}
