use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Symbols the signal service monitors, with their display names.
const BUILTIN_TOKENS: &[(&str, &str)] = &[
    ("CAKE", "PancakeSwap"),
    ("WBNB", "Wrapped BNB"),
    ("BNB", "BNB"),
    ("BTCB", "Bitcoin BEP2"),
    ("ETH", "Ethereum Token"),
    ("XRP", "XRP Token"),
    ("ADA", "Cardano Token"),
    ("DOGE", "Dogecoin"),
    ("DOT", "Polkadot Token"),
    ("LINK", "ChainLink Token"),
    ("UNI", "Uniswap"),
    ("LTC", "Litecoin Token"),
    ("TWT", "Trust Wallet"),
    ("XVS", "Venus"),
    ("ALPACA", "Alpaca Finance"),
    ("BAKE", "BakeryToken"),
    ("SFP", "SafePal Token"),
    ("FLOKI", "FLOKI"),
];

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(rename = "monitoredTokens")]
    monitored_tokens: Vec<TokenEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    symbol: String,
    name: String,
}

/// Static symbol → name lookup.
#[derive(Debug, Clone)]
pub struct TokenDirectory {
    names: HashMap<String, String>,
}

impl Default for TokenDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TokenDirectory {
    pub fn builtin() -> Self {
        let names = BUILTIN_TOKENS
            .iter()
            .map(|(sym, name)| (sym.to_string(), name.to_string()))
            .collect();
        Self { names }
    }

    /// Built-in table with entries from a `monitoredTokens` JSON file layered on top.
    pub fn with_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read token directory {}", path.display()))?;
        let file: DirectoryFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse token directory {}", path.display()))?;

        let mut dir = Self::builtin();
        for entry in file.monitored_tokens {
            dir.names.insert(entry.symbol, entry.name);
        }
        Ok(dir)
    }

    pub fn name(&self, symbol: &str) -> Option<&str> {
        self.names.get(symbol).map(String::as_str)
    }

    /// Display name for a symbol, falling back to the symbol itself.
    pub fn name_or_symbol<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.name(symbol).unwrap_or(symbol)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let dir = TokenDirectory::builtin();
        assert_eq!(dir.name("CAKE"), Some("PancakeSwap"));
        assert_eq!(dir.name_or_symbol("CAKE"), "PancakeSwap");
        assert_eq!(dir.name_or_symbol("NOPE"), "NOPE");
    }

    #[test]
    fn test_file_overrides_and_extends() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"monitoredTokens": [
                {{"symbol": "CAKE", "name": "Cake Token"}},
                {{"symbol": "MBOX", "name": "Mobox"}}
            ]}}"#
        )
        .unwrap();

        let dir = TokenDirectory::with_file(f.path()).unwrap();
        assert_eq!(dir.name("CAKE"), Some("Cake Token"));
        assert_eq!(dir.name("MBOX"), Some("Mobox"));
        assert_eq!(dir.name("WBNB"), Some("Wrapped BNB"));
    }

    #[test]
    fn test_bad_file_is_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(TokenDirectory::with_file(f.path()).is_err());
    }
}
