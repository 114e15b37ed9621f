use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::wallet::slippage::MAX_SLIPPAGE_BPS;

/// Signer key is read from the environment, never from config.toml.
pub const PRIVATE_KEY_ENV: &str = "DEXBOT_PRIVATE_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub endpoints: Endpoints,
    pub polling: Polling,
    pub chain: Chain,
    pub tokens: Tokens,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
    /// Zone used when nothing is saved and geolocation fails.
    pub default_timezone: String,
    /// JSON file standing in for browser local storage.
    pub settings_path: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_timezone: "Asia/Singapore".to_string(),
            settings_path: "./dexbot-settings.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub signals_url: String,
    pub contract_status_url: String,
    pub accuracy_url: String,
    pub location_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            signals_url: "https://bot.securearbitrage.com/api/signals".to_string(),
            contract_status_url: "https://backend.thedexbot.com/apis/contract-status".to_string(),
            accuracy_url: "https://bot.securearbitrage.com/api/accuracy-stats".to_string(),
            location_url: "https://ipwho.is/".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Polling {
    /// Countdown length before the signal table is refetched
    pub signals_refresh_secs: u64,
    pub contract_status_secs: u64,
    pub accuracy_secs: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            signals_refresh_secs: 30,
            contract_status_secs: 2,
            accuracy_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Chain {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Trading bot contract holding deposits
    pub contract_address: String,
    /// PancakeSwap v2 router used for quotes
    pub router_address: String,
    /// Stable token deposits are held in (BUSD-peg on BSC)
    pub quote_token: String,
    pub slippage_bps: u32,
    pub deadline_secs: u64,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            rpc_url: "https://bsc-dataseed.binance.org".to_string(),
            chain_id: 56,
            contract_address: "0xa257B7Cc03B962888c9812611FBCb843Dd274477".to_string(),
            router_address: "0x10ED43C718714eb63d5aA57B78B54704E256024E".to_string(),
            quote_token: "0x55d398326f99059fF775485246999027B3197955".to_string(),
            slippage_bps: 50,
            deadline_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tokens {
    /// Optional `{"monitoredTokens": [...]}` file merged over the built-in table
    pub directory_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("failed to parse {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// `None` when `path` does not exist; a present but broken file is an error.
    pub fn load_optional(path: &str) -> anyhow::Result<Option<Self>> {
        if Path::new(path).exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let p = &self.polling;
        if p.signals_refresh_secs == 0 || p.contract_status_secs == 0 || p.accuracy_secs == 0 {
            return Err(anyhow!("polling intervals must be non-zero"));
        }
        if self.chain.slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(anyhow!(
                "slippage_bps ({}) exceeds max ({MAX_SLIPPAGE_BPS})",
                self.chain.slippage_bps
            ));
        }
        for (name, value) in [
            ("contract_address", &self.chain.contract_address),
            ("router_address", &self.chain.router_address),
            ("quote_token", &self.chain.quote_token),
        ] {
            value
                .parse::<alloy_primitives::Address>()
                .map_err(|e| anyhow!("chain.{name} is not an address: {e}"))?;
        }
        Ok(())
    }
}
