//! Recipe Descriptor - what the package tool builds
//!
//! The recipe is consumed here, never produced. Only the metadata the
//! release flow needs is interpreted; the rest is carried for the tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::tool::BuildConfiguration;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Failed to read recipe {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse recipe {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub version: String,
    #[serde(default = "default_settings")]
    pub settings: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub build_requires: Vec<String>,
    #[serde(default)]
    pub scm: Option<Scm>,
    /// Option name -> allowed values
    #[serde(default)]
    pub options: BTreeMap<String, Vec<OptionValue>>,
    /// `option` or `dependency:option` -> value
    #[serde(default)]
    pub default_options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub package: Vec<CopyRule>,
}

fn default_settings() -> Vec<String> {
    ["os", "compiler", "build_type", "arch"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// Rendering used on the package tool command line (`True`/`False`).
    pub fn as_arg(&self) -> String {
        match self {
            OptionValue::Bool(true) => "True".to_string(),
            OptionValue::Bool(false) => "False".to_string(),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scm {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subfolder: Option<String>,
    /// `"auto"` resolves from the local checkout
    pub url: String,
    pub revision: String,
}

/// Which files are collected into the installed artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyRule {
    pub pattern: String,
    pub dst: String,
    #[serde(default)]
    pub src: Option<String>,
}

impl Recipe {
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| RecipeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn shared_default(&self) -> bool {
        !matches!(self.default_options.get("shared"), Some(OptionValue::Bool(false)))
    }

    pub fn has_shared_option(&self) -> bool {
        self.options.contains_key("shared")
    }

    /// The single configuration built when nothing else is requested.
    pub fn default_build(&self) -> Vec<BuildConfiguration> {
        vec![BuildConfiguration::default()]
    }

    /// Release/Debug, crossed with static/shared when the recipe offers it.
    pub fn common_builds(&self) -> Vec<BuildConfiguration> {
        let linkages: Vec<Option<bool>> = if self.has_shared_option() {
            vec![Some(false), Some(true)]
        } else {
            vec![None]
        };

        let mut builds = vec![];
        for build_type in ["Release", "Debug"] {
            for shared in &linkages {
                let mut config = BuildConfiguration::default()
                    .with_setting("build_type", build_type);
                if let Some(shared) = shared {
                    config = config.with_option(
                        format!("{}:shared", self.name),
                        OptionValue::Bool(*shared).as_arg(),
                    );
                }
                builds.push(config);
            }
        }
        builds
    }
}
