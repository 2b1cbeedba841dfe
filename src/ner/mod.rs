mod most_frequent_tagger;
mod tagging_utils;
mod vocab;

use std::fs::File;
use std::path::{Path, PathBuf};

use failure::ResultExt;
use log::{debug, info, warn};
use ndarray::prelude::*;

use crate::errors::*;
use crate::models::{Entity, NerConfig, TaggingScheme};

pub use self::most_frequent_tagger::MostFrequentTagTagger;
pub use self::tagging_utils::{tags_to_entities, OUTSIDE};
pub use self::vocab::{Vocabulary, PAD_INDEX, PAD_TOKEN, UNK_INDEX, UNK_TOKEN};

/// Padded batch of utterances
///
/// - `tokens`: token indexes with shape (batch size, max utterance length)
/// - `chars`: character indexes with shape (batch size, max utterance length,
///   max token length)
/// - `mask`: 1 for real tokens, 0 for padding
#[derive(Debug, Clone, PartialEq)]
pub struct TaggerBatch {
    pub tokens: Array2<usize>,
    pub chars: Array3<usize>,
    pub mask: Array2<f32>,
    pub lengths: Vec<usize>,
}

/// Sequence labelling model working on padded index batches
pub trait SequenceTagger: Send {
    /// Returns tag indexes with the same shape as `batch.tokens`
    fn predict(&mut self, batch: &TaggerBatch) -> Result<Array2<usize>>;
    fn train(&mut self, batch: &TaggerBatch, tags: &ArrayView2<usize>) -> Result<f32>;
    fn save(&self, path: &Path) -> Result<()>;
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Pads token and character indexes, returns `None` when the longest utterance
/// of the batch is empty
pub fn prepare_batch(
    tokens_idxs: &[Vec<usize>],
    chars_idxs: &[Vec<Vec<usize>>],
) -> Option<TaggerBatch> {
    let batch_size = tokens_idxs.len();
    let max_utterance_len = tokens_idxs.iter().map(|utterance| utterance.len()).max()?;
    if max_utterance_len == 0 {
        return None;
    }
    let max_token_len = chars_idxs
        .iter()
        .flat_map(|utterance| utterance.iter().map(|token| token.len()))
        .max()
        .unwrap_or(0);

    let mut tokens = Array2::from_elem((batch_size, max_utterance_len), PAD_INDEX);
    let mut chars = Array3::from_elem((batch_size, max_utterance_len, max_token_len), PAD_INDEX);
    let mut mask = Array2::zeros((batch_size, max_utterance_len));
    for (n, utterance) in tokens_idxs.iter().enumerate() {
        for (k, &token) in utterance.iter().enumerate() {
            tokens[(n, k)] = token;
            mask[(n, k)] = 1.;
            let token_chars = chars_idxs
                .get(n)
                .and_then(|utterance_chars| utterance_chars.get(k))
                .map(|token_chars| token_chars.as_slice())
                .unwrap_or(&[]);
            for (c, &char_index) in token_chars.iter().enumerate() {
                chars[(n, k, c)] = char_index;
            }
        }
    }
    Some(TaggerBatch {
        tokens,
        chars,
        mask,
        lengths: tokens_idxs.iter().map(|utterance| utterance.len()).collect(),
    })
}

fn pad_tags(tags_idxs: &[Vec<usize>], batch: &TaggerBatch) -> Result<Array2<usize>> {
    if tags_idxs.len() != batch.lengths.len() {
        return Err(HcnError::ShapeMismatch {
            name: "tags batch".to_string(),
            expected: batch.lengths.len(),
            found: tags_idxs.len(),
        }
        .into());
    }
    let mut tags = Array2::from_elem(batch.tokens.dim(), PAD_INDEX);
    for (n, (utterance_tags, &length)) in tags_idxs.iter().zip(batch.lengths.iter()).enumerate() {
        if utterance_tags.len() != length {
            return Err(HcnError::ShapeMismatch {
                name: format!("tags of utterance {}", n),
                expected: length,
                found: utterance_tags.len(),
            }
            .into());
        }
        for (k, &tag) in utterance_tags.iter().enumerate() {
            tags[(n, k)] = tag;
        }
    }
    Ok(tags)
}

/// Named entity tagger: vocabulary lookups, padding and decoding around a
/// `SequenceTagger`
pub struct NerTagger {
    tokens_vocab: Vocabulary,
    chars_vocab: Vocabulary,
    tags_vocab: Vocabulary,
    tagging_scheme: TaggingScheme,
    tagger: Box<dyn SequenceTagger>,
    save_to: Option<PathBuf>,
}

impl NerTagger {
    /// Loads the configuration from `ner.json` and the vocabularies it points
    /// to, the tagger being a `MostFrequentTagTagger`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().join("ner.json");
        let config_file = File::open(&config_path)
            .with_context(|_| HcnError::ModelLoad(format!("{:?}", config_path)))?;
        let config: NerConfig = serde_json::from_reader(config_file)
            .with_context(|_| format!("Invalid ner config file {:?}", &config_path))?;

        let tokens_vocab = Vocabulary::from_path(path.as_ref().join(&config.tokens_vocab))?;
        let chars_vocab = Vocabulary::from_path(path.as_ref().join(&config.chars_vocab))?;
        let tags_vocab = Vocabulary::from_path(path.as_ref().join(&config.tags_vocab))?;
        info!(
            "Using {} tokens, {} chars and {} tags",
            tokens_vocab.len(),
            chars_vocab.len(),
            tags_vocab.len()
        );

        let mut tagger = MostFrequentTagTagger::new(tags_vocab.index_of(OUTSIDE));
        if let Some(model_name) = config.load.as_ref() {
            let model_path = path.as_ref().join(model_name);
            if model_path.exists() {
                tagger.load(&model_path)?;
            } else {
                info!("No tagger found at {:?}, starting from scratch", model_path);
            }
        }

        let mut ner = Self::new(
            tokens_vocab,
            chars_vocab,
            tags_vocab,
            config.tagging_scheme,
            Box::new(tagger),
        );
        ner.save_to = config.save_to.as_ref().map(|name| path.as_ref().join(name));
        Ok(ner)
    }

    pub fn new(
        tokens_vocab: Vocabulary,
        chars_vocab: Vocabulary,
        tags_vocab: Vocabulary,
        tagging_scheme: TaggingScheme,
        tagger: Box<dyn SequenceTagger>,
    ) -> Self {
        Self {
            tokens_vocab,
            chars_vocab,
            tags_vocab,
            tagging_scheme,
            tagger,
            save_to: None,
        }
    }

    pub fn tagging_scheme(&self) -> TaggingScheme {
        self.tagging_scheme
    }

    pub fn tags_vocab(&self) -> &Vocabulary {
        &self.tags_vocab
    }

    fn prepare<S: AsRef<str>>(&self, tokens_batch: &[Vec<S>]) -> Option<TaggerBatch> {
        let tokens_idxs = self.tokens_vocab.process(tokens_batch);
        let chars_idxs = self.chars_vocab.process_chars(tokens_batch);
        prepare_batch(&tokens_idxs, &chars_idxs)
    }

    /// Tags each utterance of the batch, `None` meaning the batch only holds
    /// empty utterances
    pub fn infer<S: AsRef<str>>(
        &mut self,
        tokens_batch: &[Vec<S>],
    ) -> Result<Option<Vec<Vec<String>>>> {
        let batch = match self.prepare(tokens_batch) {
            Some(batch) => batch,
            None => {
                debug!("Empty batch, nothing to tag");
                return Ok(None);
            }
        };
        let predictions = self.tagger.predict(&batch)?;
        if predictions.dim() != batch.tokens.dim() {
            return Err(HcnError::ShapeMismatch {
                name: "predicted tags".to_string(),
                expected: batch.tokens.len(),
                found: predictions.len(),
            }
            .into());
        }
        let tags = predictions
            .outer_iter()
            .zip(batch.lengths.iter())
            .map(|(row, &length)| {
                let indexes: Vec<usize> = row.iter().take(length).cloned().collect();
                self.tags_vocab.decode(&indexes)
            })
            .collect();
        Ok(Some(tags))
    }

    /// Returns the loss, or `None` when the batch only holds empty utterances
    pub fn train_on_batch<S1, S2>(
        &mut self,
        tokens_batch: &[Vec<S1>],
        tags_batch: &[Vec<S2>],
    ) -> Result<Option<f32>>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let batch = match self.prepare(tokens_batch) {
            Some(batch) => batch,
            None => {
                debug!("Empty batch, skipping training step");
                return Ok(None);
            }
        };
        let unknown_tags = tags_batch
            .iter()
            .flat_map(|tags| tags.iter())
            .filter(|tag| !self.tags_vocab.contains(tag.as_ref()))
            .count();
        if unknown_tags > 0 {
            warn!("{} gold tags are missing from the tags vocabulary", unknown_tags);
        }
        let tags_idxs = self.tags_vocab.process(tags_batch);
        let tags = pad_tags(&tags_idxs, &batch)?;
        let loss = self.tagger.train(&batch, &tags.view())?;
        debug!("Loss {}", loss);
        Ok(Some(loss))
    }

    pub fn entities<S1, S2>(&self, tokens: &[S1], tags: &[S2]) -> Vec<Entity>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        tags_to_entities(tokens, tags, self.tagging_scheme)
    }

    pub fn save(&self) -> Result<()> {
        match self.save_to.as_ref() {
            Some(path) => self.tagger.save(path),
            None => {
                warn!("No destination configured, tagger not saved");
                Ok(())
            }
        }
    }
}
