use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use failure::ResultExt;

use crate::errors::*;

pub const PAD_TOKEN: &str = "<PAD>";
pub const UNK_TOKEN: &str = "<UNK>";
pub const PAD_INDEX: usize = 0;
pub const UNK_INDEX: usize = 1;

/// Bidirectional token/index mapping, `<PAD>` and `<UNK>` always come first
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    indexes: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|_| format!("Cannot open vocabulary file '{:?}'", path.as_ref()))?;
        Self::from_reader(file)
    }

    /// One token per line, blank lines are ignored
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut tokens = vec![];
        for line in reader.lines() {
            let token = line?;
            let token = token.trim_end_matches('\r');
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }
        Ok(Self::from_tokens(tokens))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self {
            tokens: vec![],
            indexes: HashMap::new(),
        };
        vocab.insert(PAD_TOKEN.to_string());
        vocab.insert(UNK_TOKEN.to_string());
        for token in tokens {
            vocab.insert(token.into());
        }
        vocab
    }

    fn insert(&mut self, token: String) {
        if !self.indexes.contains_key(&token) {
            self.indexes.insert(token.clone(), self.tokens.len());
            self.tokens.push(token);
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.indexes.contains_key(token)
    }

    pub fn index_of(&self, token: &str) -> usize {
        self.indexes.get(token).cloned().unwrap_or(UNK_INDEX)
    }

    pub fn token_of(&self, index: usize) -> &str {
        self.tokens
            .get(index)
            .map(|token| token.as_str())
            .unwrap_or(UNK_TOKEN)
    }

    pub fn process<S: AsRef<str>>(&self, batch: &[Vec<S>]) -> Vec<Vec<usize>> {
        batch
            .iter()
            .map(|utterance| {
                utterance
                    .iter()
                    .map(|token| self.index_of(token.as_ref()))
                    .collect()
            })
            .collect()
    }

    /// Character indexes of every token of every utterance
    pub fn process_chars<S: AsRef<str>>(&self, batch: &[Vec<S>]) -> Vec<Vec<Vec<usize>>> {
        batch
            .iter()
            .map(|utterance| {
                utterance
                    .iter()
                    .map(|token| {
                        token
                            .as_ref()
                            .chars()
                            .map(|c| self.index_of(&c.to_string()))
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn decode(&self, indexes: &[usize]) -> Vec<String> {
        indexes
            .iter()
            .map(|&index| self.token_of(index).to_string())
            .collect()
    }
}
