use alloy_primitives::U256;
use anyhow::{Context, Result};
use containers::{Fork, SealEngine};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ETHER: u128 = 1_000_000_000_000_000_000;

/// Known rulesets and the block reward each one pays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForkCatalog {
    forks: Vec<Fork>,
}

impl ForkCatalog {
    pub fn new(forks: Vec<Fork>) -> Self {
        Self { forks }
    }

    pub fn get(&self, name: &str) -> Option<&Fork> {
        self.forks.iter().find(|fork| fork.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.forks.iter().map(|fork| fork.name.as_str()).collect()
    }
}

impl Default for ForkCatalog {
    /// Mainnet forks up to London.
    fn default() -> Self {
        let schedule: [(&str, u128); 10] = [
            ("Frontier", 5 * ETHER),
            ("Homestead", 5 * ETHER),
            ("EIP150", 5 * ETHER),
            ("EIP158", 5 * ETHER),
            ("Byzantium", 3 * ETHER),
            ("Constantinople", 2 * ETHER),
            ("ConstantinopleFix", 2 * ETHER),
            ("Istanbul", 2 * ETHER),
            ("Berlin", 2 * ETHER),
            ("London", 2 * ETHER),
        ];
        Self::new(
            schedule
                .into_iter()
                .map(|(name, reward)| Fork::new(name, U256::from(reward)))
                .collect(),
        )
    }
}

/// Harness settings, read once at startup and shared read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessConfig {
    /// Transition tool executable.
    pub tool: PathBuf,
    /// Arguments put before the t8n ones, e.g. `[t8n]` when the tool is `evm`.
    #[serde(default)]
    pub tool_args: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub seal_engine: SealEngine,
    #[serde(default)]
    pub forks: ForkCatalog,
}

impl HarnessConfig {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            tool_args: Vec::new(),
            timeout_secs: None,
            seal_engine: SealEngine::default(),
            forks: ForkCatalog::default(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open config {}", path.display()))?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)
            .with_context(|| format!("cannot parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn fork(&self, name: &str) -> Result<&Fork> {
        self.forks.get(name).with_context(|| {
            format!(
                "unknown fork `{name}`, known forks: {}",
                self.forks.names().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_catalog_pays_mainnet_rewards() {
        let catalog = ForkCatalog::default();

        assert_eq!(catalog.get("Frontier").unwrap().block_reward, U256::from(5 * ETHER));
        assert_eq!(catalog.get("Byzantium").unwrap().block_reward, U256::from(3 * ETHER));
        assert_eq!(catalog.get("London").unwrap().block_reward, U256::from(2 * ETHER));
        assert!(catalog.get("Paris").is_none());
    }

    #[test]
    fn loads_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "
tool: /usr/local/bin/evm
toolArgs: [t8n]
timeoutSecs: 30
sealEngine: NoProof
forks:
  - name: Istanbul
    blockReward: '0x1bc16d674ec80000'
"
        )
        .unwrap();

        let config = HarnessConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.tool, PathBuf::from("/usr/local/bin/evm"));
        assert_eq!(config.tool_args, vec!["t8n".to_string()]);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.seal_engine, SealEngine::NoProof);
        assert_eq!(config.fork("Istanbul").unwrap().block_reward, U256::from(2 * ETHER));
        assert!(config.fork("London").is_err());
    }

    #[test]
    fn omitted_settings_take_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tool: evm").unwrap();

        let config = HarnessConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config, HarnessConfig::new("evm"));
    }
}
