use serde_derive::Deserialize;

#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(tag = "component_name")]
#[serde(rename_all = "snake_case")]
pub enum ComponentMetadata {
    Hcn,
    Ner,
}

#[derive(Debug, Deserialize)]
pub struct PipelineModel {
    pub components: Vec<String>,
}
