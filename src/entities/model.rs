// Supported NER models.
//
// Model choice is a closed set validated when the configuration loads, so a
// typo fails up front instead of after the whole corpus has been fetched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Token-classification model used for entity recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityModel {
    /// bert-base-NER, quantized (~110 MB)
    #[default]
    Small,
    /// bert-large-cased-finetuned-conll03, quantized (~335 MB)
    Large,
}

impl EntityModel {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityModel::Small => "small",
            EntityModel::Large => "large",
        }
    }

    /// HuggingFace repo hosting the ONNX export.
    pub fn hf_repo(self) -> &'static str {
        match self {
            EntityModel::Small => "Xenova/bert-base-NER",
            EntityModel::Large => "Xenova/bert-large-cased-finetuned-conll03-english",
        }
    }

    /// Subdirectory of the model directory holding this model's files.
    pub fn dir(self, base: &Path) -> PathBuf {
        base.join(format!("ner-{}", self.as_str()))
    }
}

impl fmt::Display for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "sm" => Ok(EntityModel::Small),
            "large" | "lg" => Ok(EntityModel::Large),
            _ => Err(Error::InvalidModel(s.to_string())),
        }
    }
}

impl TryFrom<String> for EntityModel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityModel> for String {
    fn from(model: EntityModel) -> Self {
        model.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_models() {
        assert_eq!("small".parse::<EntityModel>().unwrap(), EntityModel::Small);
        assert_eq!("LARGE".parse::<EntityModel>().unwrap(), EntityModel::Large);
        assert_eq!("lg".parse::<EntityModel>().unwrap(), EntityModel::Large);
    }

    #[test]
    fn test_parse_unknown_model_is_invalid_model() {
        let err = "en_core_web_trf".parse::<EntityModel>().unwrap_err();
        assert!(matches!(err, Error::InvalidModel(ref name) if name == "en_core_web_trf"));
    }

    #[test]
    fn test_model_dirs_differ() {
        let base = PathBuf::from("/tmp/models");
        assert_ne!(EntityModel::Small.dir(&base), EntityModel::Large.dir(&base));
    }
}
