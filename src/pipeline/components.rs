use std::path::Path;

use log::debug;

use crate::errors::*;
use crate::hcn_bot::HybridCodeNetworkBot;
use crate::models::TurnFeatures;
use crate::ner::NerTagger;

use super::{require, Component, TurnContext};

/// Dialog policy step: bow, emb, entities and classes in, action out
pub struct HcnComponent {
    bot: HybridCodeNetworkBot,
}

impl HcnComponent {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(HybridCodeNetworkBot::from_path(path)?))
    }

    pub fn new(bot: HybridCodeNetworkBot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> &HybridCodeNetworkBot {
        &self.bot
    }

    fn features(context: &TurnContext) -> Result<TurnFeatures> {
        Ok(TurnFeatures {
            bow: require("bow", &context.bow)?.clone(),
            emb: require("emb", &context.emb)?.clone(),
            entities: require("entities", &context.entities)?.clone(),
            classes: require("classes", &context.classes)?.clone(),
        })
    }
}

impl Component for HcnComponent {
    fn name(&self) -> &'static str {
        "hcn"
    }

    fn forward(&mut self, context: &mut TurnContext) -> Result<()> {
        let features = Self::features(context)?;
        let db_result = context.info.as_ref().and_then(|info| info.db_result.clone());
        if context.info.as_ref().map(|info| info.episode_done).unwrap_or(false) {
            self.bot.reset();
        }
        context.action = Some(self.bot.infer_on_batch(&features, db_result)?);
        Ok(())
    }

    fn train(&mut self, context: &mut TurnContext) -> Result<()> {
        let features = Self::features(context)?;
        let response = require("response", &context.response)?;
        let info = require("info", &context.info)?;
        let loss = self.bot.train_on_batch(&features, response, info)?;
        debug!("Loss {}", loss);
        context.loss = Some(loss);
        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.bot.save()
    }
}

/// Entity tagging step: tokens in, tags and entities out
pub struct NerComponent {
    tagger: NerTagger,
}

impl NerComponent {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(NerTagger::from_path(path)?))
    }

    pub fn new(tagger: NerTagger) -> Self {
        Self { tagger }
    }
}

impl Component for NerComponent {
    fn name(&self) -> &'static str {
        "ner"
    }

    fn forward(&mut self, context: &mut TurnContext) -> Result<()> {
        let tokens = require("tokens", &context.tokens)?.clone();
        let tags = self
            .tagger
            .infer(&[tokens.clone()])?
            .and_then(|mut batch_tags| batch_tags.pop())
            .unwrap_or_default();
        context.entities = Some(self.tagger.entities(&tokens, &tags));
        context.tags = Some(tags);
        Ok(())
    }

    /// Trains on the gold tags, which also provide the entities of the turn
    fn train(&mut self, context: &mut TurnContext) -> Result<()> {
        let tokens = require("tokens", &context.tokens)?.clone();
        let tags = require("tags", &context.tags)?.clone();
        let loss = self.tagger.train_on_batch(&[tokens.clone()], &[tags.clone()])?;
        context.entities = Some(self.tagger.entities(&tokens, &tags));
        context.loss = loss;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.tagger.save()
    }
}
