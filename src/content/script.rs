use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Error, Result};

/// A generated video prompt.
///
/// The model chooses most of the structure, so the document is kept as JSON
/// and only the fields the rest of the tool relies on get accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoScript(Map<String, Value>);

impl VideoScript {
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str(text)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::Generation(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_owned(), value.into());
    }

    pub fn prompt_name(&self) -> Option<&str> {
        self.get_str("prompt_name")
    }

    pub fn core_concept(&self) -> Option<&str> {
        self.get_str("core_concept")
    }

    pub fn keyword(&self) -> Option<&str> {
        self.get_str("keyword")
    }

    pub fn summary(&self) -> Option<&str> {
        self.get_str("summary")
    }

    /// Video title, falling back to `default` when the model gave none
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.prompt_name().unwrap_or(default)
    }

    /// Reel caption: title and summary as separate paragraphs
    pub fn caption(&self, default_title: &str) -> String {
        let title = self.title_or(default_title);
        match self.summary() {
            Some(summary) if !summary.is_empty() => format!("{title}\n\n{summary}"),
            _ => title.to_owned(),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Write to `dir` as `veo3_prompt_<keyword>_<timestamp>.json`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let keyword = self.keyword().unwrap_or("script").replace(' ', "_");
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("veo3_prompt_{keyword}_{stamp}.json"));

        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, self.to_pretty_json()?)?;
        info!(path = %path.display(), "script saved");
        Ok(path)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
