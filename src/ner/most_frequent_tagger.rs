use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use failure::ResultExt;
use log::info;
use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::errors::*;

use super::vocab::PAD_INDEX;
use super::{SequenceTagger, TaggerBatch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TagCounts {
    default_tag: usize,
    /// token index -> tag index -> number of occurrences
    counts: HashMap<usize, HashMap<usize, usize>>,
}

/// Baseline tagger predicting, for each token, the tag it was most often seen
/// with during training
///
/// Unseen tokens get the default tag, ties are broken in favor of the lowest
/// tag index.
pub struct MostFrequentTagTagger {
    model: TagCounts,
}

impl MostFrequentTagTagger {
    pub fn new(default_tag: usize) -> Self {
        Self {
            model: TagCounts {
                default_tag,
                counts: HashMap::new(),
            },
        }
    }

    fn best_tag(&self, token: usize) -> usize {
        self.model
            .counts
            .get(&token)
            .and_then(|tag_counts| {
                tag_counts
                    .iter()
                    .max_by(|(tag_a, count_a), (tag_b, count_b)| {
                        count_a.cmp(count_b).then(tag_b.cmp(tag_a))
                    })
                    .map(|(tag, _)| *tag)
            })
            .unwrap_or(self.model.default_tag)
    }
}

impl SequenceTagger for MostFrequentTagTagger {
    fn predict(&mut self, batch: &TaggerBatch) -> Result<Array2<usize>> {
        let mut tags = Array2::from_elem(batch.tokens.dim(), PAD_INDEX);
        for ((i, j), &mask) in batch.mask.indexed_iter() {
            if mask > 0. {
                tags[(i, j)] = self.best_tag(batch.tokens[(i, j)]);
            }
        }
        Ok(tags)
    }

    /// The returned loss is the tagging error rate before the update
    fn train(&mut self, batch: &TaggerBatch, tags: &ArrayView2<usize>) -> Result<f32> {
        if tags.dim() != batch.tokens.dim() {
            return Err(HcnError::ShapeMismatch {
                name: "gold tags".to_string(),
                expected: batch.tokens.len(),
                found: tags.len(),
            }
            .into());
        }
        let mut nb_tokens = 0;
        let mut nb_errors = 0;
        for ((i, j), &mask) in batch.mask.indexed_iter() {
            if mask <= 0. {
                continue;
            }
            let token = batch.tokens[(i, j)];
            let tag = tags[(i, j)];
            nb_tokens += 1;
            if self.best_tag(token) != tag {
                nb_errors += 1;
            }
            *self
                .model
                .counts
                .entry(token)
                .or_insert_with(HashMap::new)
                .entry(tag)
                .or_insert(0) += 1;
        }
        if nb_tokens == 0 {
            return Ok(0.);
        }
        Ok(nb_errors as f32 / nb_tokens as f32)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|_| format!("Cannot create tagger file '{:?}'", path))?;
        serde_json::to_writer(file, &self.model)
            .with_context(|_| "Cannot serialize tagger counts")?;
        info!("Tagger saved to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|_| format!("Cannot open tagger file '{:?}'", path))?;
        self.model = serde_json::from_reader(file)
            .with_context(|_| "Cannot deserialize tagger json data")?;
        info!("Tagger loaded from {:?}", path);
        Ok(())
    }
}
