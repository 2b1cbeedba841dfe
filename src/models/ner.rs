use serde_derive::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NerConfig {
    pub tokens_vocab: String,
    pub chars_vocab: String,
    pub tags_vocab: String,
    #[serde(default)]
    pub tagging_scheme: TaggingScheme,
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub save_to: Option<String>,
}

#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum TaggingScheme {
    #[serde(rename = "io")]
    IO,
    #[serde(rename = "bio")]
    BIO,
    #[serde(rename = "bilou")]
    BILOU,
}

impl Default for TaggingScheme {
    fn default() -> Self {
        TaggingScheme::BIO
    }
}
