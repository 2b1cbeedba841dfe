mod components;

use std::fs;
use std::path::Path;

use failure::ResultExt;
use log::info;

use crate::errors::*;
use crate::hcn_bot::BotAction;
use crate::models::{ComponentMetadata, Entity, PipelineModel, TurnInfo};

pub use self::components::{HcnComponent, NerComponent};

/// Values exchanged between the components of a pipeline for one turn
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub text: Option<String>,
    pub tokens: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub bow: Option<Vec<f32>>,
    pub emb: Option<Vec<f32>>,
    pub entities: Option<Vec<Entity>>,
    pub classes: Option<Vec<f32>>,
    pub response: Option<String>,
    pub info: Option<TurnInfo>,
    pub action: Option<BotAction>,
    pub loss: Option<f32>,
}

fn require<'a, T>(name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| HcnError::MissingInput(name.to_string()).into())
}

pub trait Component: Send {
    fn name(&self) -> &'static str;

    /// Reads its inputs from the context and writes its outputs back
    fn forward(&mut self, context: &mut TurnContext) -> Result<()>;

    fn train(&mut self, context: &mut TurnContext) -> Result<()>;

    fn save(&self) -> Result<()>;

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

pub fn build_component<P: AsRef<Path>>(
    metadata: ComponentMetadata,
    path: P,
) -> Result<Box<dyn Component>> {
    match metadata {
        ComponentMetadata::Hcn => Ok(Box::new(HcnComponent::from_path(path)?) as _),
        ComponentMetadata::Ner => Ok(Box::new(NerComponent::from_path(path)?) as _),
    }
}

fn load_metadata(component_path: &Path, component_name: &str) -> Result<ComponentMetadata> {
    let metadata_path = component_path.join("metadata.json");
    let metadata_file = fs::File::open(&metadata_path).with_context(|_| {
        format!(
            "Could not open metadata file of component '{}'",
            component_name
        )
    })?;
    let metadata: serde_json::Value = serde_json::from_reader(metadata_file).with_context(|_| {
        format!(
            "Could not deserialize json metadata of component '{}'",
            component_name
        )
    })?;
    let declared_name = metadata
        .get("component_name")
        .and_then(|name| name.as_str())
        .unwrap_or(component_name)
        .to_string();
    Ok(serde_json::from_value(metadata).map_err(|_| HcnError::UnknownComponent(declared_name))?)
}

/// Ordered chain of components sharing a `TurnContext`
pub struct Pipeline {
    components: Vec<Box<dyn Component>>,
}

impl Pipeline {
    /// Builds the components listed in `pipeline.json`, each one living in its
    /// own directory along with a `metadata.json` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pipeline_path = path.as_ref().join("pipeline.json");
        let pipeline_file = fs::File::open(&pipeline_path)
            .with_context(|_| HcnError::ModelLoad(format!("{:?}", pipeline_path)))?;
        let model: PipelineModel = serde_json::from_reader(pipeline_file)
            .with_context(|_| format!("Invalid pipeline file {:?}", &pipeline_path))?;

        let components = model
            .components
            .iter()
            .map(|component_name| {
                let component_path = path.as_ref().join(component_name);
                let metadata = load_metadata(&component_path, component_name)?;
                build_component(metadata, component_path)
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Pipeline loaded with components [{}]",
            components
                .iter()
                .map(|component| component.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self::new(components))
    }

    pub fn new(components: Vec<Box<dyn Component>>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    pub fn forward(&mut self, context: &mut TurnContext) -> Result<()> {
        for component in self.components.iter_mut() {
            component.forward(context)?;
        }
        Ok(())
    }

    pub fn train(&mut self, context: &mut TurnContext) -> Result<()> {
        for component in self.components.iter_mut() {
            component.train(context)?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        for component in self.components.iter() {
            component.save()?;
        }
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        for component in self.components.iter_mut() {
            component.shutdown()?;
        }
        Ok(())
    }
}
