use std::path::Path;

use anyhow::Context;
use gensc_contract::ContractConfig;
use gensc_state::MemoryStateConfig;
use serde::{Deserialize, Serialize};

/// Contents of the `--config` file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Maximum tracing level: `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub contract: ContractConfig,
    pub state: MemoryStateConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            contract: ContractConfig::default(),
            state: MemoryStateConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Read `path`, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level '{}'", self.log_level))
    }
}
