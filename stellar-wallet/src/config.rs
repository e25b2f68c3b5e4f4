//! Network and Horizon endpoint configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{Error, Result};

/// Default Horizon server for the test network
pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
/// Default Horizon server for the public network
pub const PUBLIC_HORIZON_URL: &str = "https://horizon.stellar.org";
/// Testnet faucet
pub const FRIENDBOT_URL: &str = "https://friendbot.stellar.org";
/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Passphrase signed into every test network transaction
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
/// Passphrase signed into every public network transaction
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Stellar networks the tools can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// Test network (SDF testnet)
    #[default]
    Testnet,
    /// Public network (mainnet)
    Public,
}

impl Network {
    /// Horizon URL used when no override is given
    pub fn default_horizon_url(&self) -> &'static str {
        match self {
            Self::Testnet => TESTNET_HORIZON_URL,
            Self::Public => PUBLIC_HORIZON_URL,
        }
    }

    /// Whether a friendbot faucet exists for this network
    pub fn has_friendbot(&self) -> bool {
        matches!(self, Self::Testnet)
    }

    /// Network passphrase
    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Testnet => TESTNET_PASSPHRASE,
            Self::Public => PUBLIC_PASSPHRASE,
        }
    }

    /// SHA-256 of the passphrase, prefixed to transaction hashes
    pub fn network_id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" | "test" => Ok(Self::Testnet),
            "public" | "mainnet" | "pubnet" => Ok(Self::Public),
            other => Err(Error::Config(format!("Unknown network: {}", other))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => write!(f, "testnet"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Horizon client configuration
#[derive(Debug, Clone)]
pub struct HorizonConfig {
    /// Network the endpoints belong to
    pub network: Network,
    /// Horizon base URL; its path always ends with `/`
    pub horizon_url: Url,
    /// Friendbot URL (only used on the test network)
    pub friendbot_url: Url,
    /// Timeout in seconds, never zero
    pub timeout_secs: u64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

impl HorizonConfig {
    /// Configuration with the stock endpoints of `network`
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            horizon_url: stock_url(network.default_horizon_url()),
            friendbot_url: stock_url(FRIENDBOT_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from `STELLAR_NETWORK`, `HORIZON_URL`,
    /// `FRIENDBOT_URL` and `HORIZON_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let network = match non_empty("STELLAR_NETWORK") {
            Some(value) => value.parse()?,
            None => Network::default(),
        };

        let mut config = Self::for_network(network);

        if let Some(url) = non_empty("HORIZON_URL") {
            config = config.with_horizon_url(&url)?;
        }

        if let Some(url) = non_empty("FRIENDBOT_URL") {
            config = config.with_friendbot_url(&url)?;
        }

        if let Some(timeout) = non_empty("HORIZON_TIMEOUT_SECS") {
            config.timeout_secs = match timeout.trim().parse() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::Config(format!(
                        "HORIZON_TIMEOUT_SECS must be a positive number of seconds: {}",
                        timeout
                    )))
                }
            };
        }

        Ok(config)
    }

    /// Replace the Horizon URL
    pub fn with_horizon_url(mut self, url: &str) -> Result<Self> {
        self.horizon_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Replace the friendbot URL
    pub fn with_friendbot_url(mut self, url: &str) -> Result<Self> {
        self.friendbot_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a path relative to the Horizon base URL
    pub fn horizon_endpoint(&self, path: &str) -> Result<Url> {
        self.horizon_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid Horizon path {}: {}", path, e)))
    }
}

/// Parse an http(s) base URL that request paths are joined onto
///
/// Queries and fragments are rejected since joined paths would drop them.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid URL {}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!("URL must use http or https: {}", raw)));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config(format!("URL has no host: {}", raw)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(format!(
            "URL must not carry a query or fragment: {}",
            raw
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn stock_url(url: &'static str) -> Url {
    // The stock endpoints are constants and always parse.
    Url::parse(url).unwrap_or_else(|_| unreachable!("invalid built-in URL {}", url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_testnet() {
        let config = HorizonConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.horizon_url.as_str(), "https://horizon-testnet.stellar.org/");
        assert_eq!(config.friendbot_url.as_str(), "https://friendbot.stellar.org/");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_public_network() {
        let config = HorizonConfig::from_vars(vars(&[("STELLAR_NETWORK", "Public")])).unwrap();
        assert_eq!(config.network, Network::Public);
        assert_eq!(config.horizon_url.as_str(), "https://horizon.stellar.org/");
        assert!(!config.network.has_friendbot());
    }

    #[test]
    fn test_overrides() {
        let config = HorizonConfig::from_vars(vars(&[
            ("HORIZON_URL", "http://localhost:8000"),
            ("FRIENDBOT_URL", "http://localhost:8001/fund"),
            ("HORIZON_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.horizon_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.friendbot_url.as_str(), "http://localhost:8001/fund/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        let cases: &[(&str, &str)] = &[
            ("STELLAR_NETWORK", "moon"),
            ("HORIZON_URL", "localhost:8000"),
            ("HORIZON_URL", "ftp://example.org"),
            ("HORIZON_URL", "http://exa mple.org"),
            ("HORIZON_URL", "http://127.0.0.1:8000?x=1"),
            ("HORIZON_URL", "http://127.0.0.1:8000/#top"),
            ("FRIENDBOT_URL", "friendbot"),
            ("HORIZON_TIMEOUT_SECS", "soon"),
            ("HORIZON_TIMEOUT_SECS", "0"),
            ("HORIZON_TIMEOUT_SECS", "-3"),
        ];

        for (key, value) in cases {
            let result = HorizonConfig::from_vars(vars(&[(key, value)]));
            assert!(
                matches!(result, Err(Error::Config(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = HorizonConfig::default()
            .with_horizon_url("https://example.org/horizon")
            .unwrap();
        let url = config.horizon_endpoint("accounts/GABC").unwrap();
        assert_eq!(url.as_str(), "https://example.org/horizon/accounts/GABC");
    }

    #[test]
    fn test_network_passphrases() {
        assert_eq!(Network::Testnet.passphrase(), TESTNET_PASSPHRASE);
        assert_eq!(Network::Public.passphrase(), PUBLIC_PASSPHRASE);
        assert_ne!(Network::Testnet.network_id(), Network::Public.network_id());
    }
}
