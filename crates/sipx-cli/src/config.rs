//! `sipx.toml` configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use sipx_prov::PremisAgent;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file looked up in the working directory when `--config`
/// is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sipx.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub agent: AgentConfig,
    pub pip: PipConfig,
}

/// The agent recorded for events written by `sipx premis`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub id_type: String,
    pub id_value: String,
    pub name: String,
    pub agent_type: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id_type: "url".to_string(),
            id_value: "https://github.com/artefactual-sdps/enduro".to_string(),
            name: "Enduro".to_string(),
            agent_type: "software".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn to_agent(&self) -> PremisAgent {
        PremisAgent::new(
            self.id_type.as_str(),
            self.id_value.as_str(),
            self.name.as_str(),
            self.agent_type.as_str(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipConfig {
    /// Where `sipx identifiers` writes the sidecar when `--output` is absent.
    pub identifiers_file: PathBuf,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            identifiers_file: PathBuf::from("metadata/identifiers.json"),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid configuration")
    }

    /// Load an explicitly named file, or `sipx.toml` if it exists.
    ///
    /// A missing explicit file is an error; a missing default file yields
    /// the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let source = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&source)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
