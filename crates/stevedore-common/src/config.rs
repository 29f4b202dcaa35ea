//! Conversion options supplied alongside the parsed project.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Global options for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Path of the compose file the project came from.
    pub input_file: PathBuf,
    /// Replica count for long-running services.
    pub replicas: u32,
    /// Serialization format of the generated objects.
    pub output_format: OutputFormat,
    /// Repository URL to build from instead of the current git remote.
    pub build_repo: Option<String>,
    /// Branch to build from instead of the current git branch.
    pub build_branch: Option<String>,
    /// Back volumes with `emptyDir` instead of persistent volume claims.
    pub empty_volumes: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from(crate::constants::DEFAULT_INPUT_FILE),
            replicas: crate::constants::DEFAULT_REPLICAS,
            output_format: OutputFormat::default(),
            build_repo: None,
            build_branch: None,
            empty_volumes: false,
        }
    }
}

/// Serialization format for the object graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Multi-document YAML stream.
    #[default]
    Yaml,
    /// A single JSON `List` object.
    Json,
}
