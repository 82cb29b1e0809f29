//! Engine configuration.

use cpamm_quote_chain::prelude::{CacheConfig, ContractId, HiroConfig, MAINNET_API_URL};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Deployer of the Velar constant-product contracts on mainnet.
pub const VELAR_DEPLOYER: &str = "SP1Y5YSTAHZ88XYK1VPDH24GY0HPX5J4JECTMY4A1";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be used.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Where swap and deposit amounts are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathSource {
    /// Delegate to the on-chain library and router contracts.
    #[default]
    Chain,
    /// Evaluate the constant-product formulas locally.
    Local,
}

impl MathSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Local => "local",
        }
    }
}

impl FromStr for MathSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" => Ok(Self::Chain),
            "local" => Ok(Self::Local),
            other => Err(format!("expected `chain` or `local`, got `{other}`")),
        }
    }
}

/// The three DEX contracts the engine reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexContracts {
    /// Pool registry (`get-pool-id`, `get-pool`).
    pub core: ContractId,
    /// Swap math (`get-amount-out`, `get-amount-in`).
    pub library: ContractId,
    /// Deposit math (`add-liquidity-calc`).
    pub router: ContractId,
}

impl Default for DexContracts {
    fn default() -> Self {
        Self {
            core: ContractId::new(VELAR_DEPLOYER, "univ2-core"),
            library: ContractId::new(VELAR_DEPLOYER, "univ2-library"),
            router: ContractId::new(VELAR_DEPLOYER, "univ2-router"),
        }
    }
}

/// Configuration for the quote engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Stacks node or Hiro API base URL.
    pub api_url: String,
    /// Optional Hiro API key.
    pub api_key: Option<String>,
    /// Sender principal for read-only calls.
    pub sender: String,
    pub contracts: DexContracts,
    pub math_source: MathSource,
    /// Response cache TTL in seconds. Zero disables caching.
    pub cache_ttl_secs: u64,
    /// Maximum cached responses.
    pub cache_capacity: usize,
    /// Maximum in-flight items per batch.
    pub batch_concurrency: usize,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let node = HiroConfig::default();
        Self {
            api_url: MAINNET_API_URL.to_string(),
            api_key: None,
            sender: node.sender,
            contracts: DexContracts::default(),
            math_source: MathSource::Chain,
            cache_ttl_secs: 30,
            cache_capacity: 4096,
            batch_concurrency: 8,
            request_timeout_secs: node.timeout_secs,
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from `CPAMM_*` environment variables,
    /// falling back to defaults for unset ones.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("CPAMM_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = get("CPAMM_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(sender) = get("CPAMM_SENDER") {
            config.sender = sender;
        }
        if let Some(value) = get("CPAMM_CORE_CONTRACT") {
            config.contracts.core = parse("CPAMM_CORE_CONTRACT", &value)?;
        }
        if let Some(value) = get("CPAMM_LIBRARY_CONTRACT") {
            config.contracts.library = parse("CPAMM_LIBRARY_CONTRACT", &value)?;
        }
        if let Some(value) = get("CPAMM_ROUTER_CONTRACT") {
            config.contracts.router = parse("CPAMM_ROUTER_CONTRACT", &value)?;
        }
        if let Some(value) = get("CPAMM_MATH_SOURCE") {
            config.math_source = parse("CPAMM_MATH_SOURCE", &value)?;
        }
        if let Some(value) = get("CPAMM_CACHE_TTL_SECS") {
            config.cache_ttl_secs = parse("CPAMM_CACHE_TTL_SECS", &value)?;
        }
        if let Some(value) = get("CPAMM_CACHE_CAPACITY") {
            config.cache_capacity = parse("CPAMM_CACHE_CAPACITY", &value)?;
        }
        if let Some(value) = get("CPAMM_BATCH_CONCURRENCY") {
            config.batch_concurrency = parse("CPAMM_BATCH_CONCURRENCY", &value)?;
            if config.batch_concurrency == 0 {
                return Err(ConfigError::invalid(
                    "CPAMM_BATCH_CONCURRENCY",
                    &value,
                    "must be at least 1",
                ));
            }
        }
        if let Some(value) = get("CPAMM_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse("CPAMM_REQUEST_TIMEOUT_SECS", &value)?;
        }

        Ok(config)
    }

    /// Node client settings.
    pub fn hiro_config(&self) -> HiroConfig {
        HiroConfig {
            base_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            sender: self.sender.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Response cache settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            capacity: self.cache_capacity,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.api_url, MAINNET_API_URL);
        assert_eq!(config.math_source, MathSource::Chain);
        assert_eq!(config.batch_concurrency, 8);
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.contracts.core.name, "univ2-core");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("CPAMM_API_URL", "http://localhost:3999/"),
            ("CPAMM_MATH_SOURCE", "Local"),
            ("CPAMM_BATCH_CONCURRENCY", "2"),
            (
                "CPAMM_CORE_CONTRACT",
                "SP000000000000000000002Q6VF78.amm-core",
            ),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:3999");
        assert_eq!(config.math_source, MathSource::Local);
        assert_eq!(config.batch_concurrency, 2);
        assert_eq!(config.contracts.core.name, "amm-core");
        assert_eq!(config.hiro_config().base_url, "http://localhost:3999");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = EngineConfig::from_lookup(lookup(&[("CPAMM_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            ("CPAMM_MATH_SOURCE", "oracle"),
            ("CPAMM_CACHE_TTL_SECS", "-1"),
            ("CPAMM_BATCH_CONCURRENCY", "0"),
            ("CPAMM_ROUTER_CONTRACT", "no-dot"),
        ] {
            let err = EngineConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
