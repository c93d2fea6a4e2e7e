use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How block rewards are settled when a block is sealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SealEngine {
    /// No miner reward at all, so post-state roots only reflect transactions.
    #[default]
    NoReward,
    /// Standard reward schedule, proof-of-work seal not checked.
    NoProof,
    /// Standard reward schedule with an ethash seal.
    Ethash,
}

impl SealEngine {
    pub fn pays_reward(self) -> bool {
        !matches!(self, SealEngine::NoReward)
    }
}

impl fmt::Display for SealEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SealEngine::NoReward => "NoReward",
            SealEngine::NoProof => "NoProof",
            SealEngine::Ethash => "Ethash",
        };
        f.write_str(name)
    }
}

impl FromStr for SealEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoReward" => Ok(SealEngine::NoReward),
            "NoProof" => Ok(SealEngine::NoProof),
            "Ethash" => Ok(SealEngine::Ethash),
            other => Err(format!("unknown seal engine `{other}`")),
        }
    }
}

/// A named protocol ruleset and the block reward it pays.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    pub name: String,
    pub block_reward: U256,
}

impl Fork {
    pub fn new(name: impl Into<String>, block_reward: U256) -> Self {
        Self {
            name: name.into(),
            block_reward,
        }
    }

    /// Reward credited to the coinbase under `engine`, `None` when rewards are off.
    pub fn reward_for(&self, engine: SealEngine) -> Option<U256> {
        engine.pays_reward().then_some(self.block_reward)
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
