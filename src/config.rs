//! JSON configuration for the bot.
//!
//! Every field has a default, so `{}` is a valid configuration: it
//! loads `chess_model.onnx` from the working directory with the tract
//! backend and the default decision settings.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::BotError, model::Backend, normalize::DecisionSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub model: ModelConfig,
    pub decision: DecisionSettings,
}

impl BotConfig {
    pub fn from_json(json: &str) -> Result<Self, BotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BotError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local model file. Downloaded from `hub` when missing.
    pub path: PathBuf,
    pub hub: Option<HubSource>,
    pub backend: Backend,
    pub input_name: String,
    pub policy_output: String,
    pub value_output: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chess_model.onnx"),
            hub: None,
            backend: Backend::default(),
            input_name: "board".to_string(),
            policy_output: "policy".to_string(),
            value_output: "value".to_string(),
        }
    }
}

/// A file in a Hugging Face model repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HubSource {
    pub repo_id: String,
    pub filename: String,
    #[serde(default = "default_revision")]
    pub revision: String,
}

fn default_revision() -> String {
    "main".to_string()
}

impl HubSource {
    pub fn url(&self) -> String {
        format!(
            "https://huggingface.co/{}/resolve/{}/{}",
            self.repo_id, self.revision, self.filename
        )
    }
}
