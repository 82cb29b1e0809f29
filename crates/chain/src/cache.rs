//! TTL cache in front of a [`ChainQuery`].

use crate::clarity::ClarityValue;
use crate::contract::ContractId;
use crate::error::ChainError;
use crate::query::{ChainQuery, ChainedRead, FollowUp, ReadCall};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a successful response stays valid.
    pub ttl: Duration,
    /// Maximum number of cached responses.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            capacity: 4096,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// One value per call; chained reads keep the whole chain.
    values: Vec<ClarityValue>,
    inserted_at: Instant,
}

/// Caches successful read-only call results.
///
/// Keys combine provider, contract, method and the hex of every argument,
/// so distinct calls never share a slot. A chained read is one entry keyed
/// by its first call, so its results expire together. Failures are never
/// cached.
pub struct CachedChainQuery<Q> {
    inner: Q,
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<Q: ChainQuery> CachedChainQuery<Q> {
    /// Wraps `inner` with a cache.
    pub fn new(inner: Q, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    fn key(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<String, ChainError> {
        let mut key = format!("{}|{}|{}", self.inner.provider(), contract, method);
        for arg in args {
            key.push('|');
            key.push_str(
                &arg.to_hex()
                    .map_err(|e| ChainError::decode(contract, method, e))?,
            );
        }
        Ok(key)
    }

    async fn lookup(&self, key: &str) -> Option<Vec<ClarityValue>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.config.ttl)
            .map(|entry| entry.values.clone())
    }

    async fn store(&self, key: String, values: Vec<ClarityValue>) {
        if self.config.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write().await;
        if entries.len() >= self.config.capacity && !entries.contains_key(&key) {
            let ttl = self.config.ttl;
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            if entries.len() >= self.config.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                values,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops every cached response.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Gets cache statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl<Q: ChainQuery> ChainQuery for CachedChainQuery<Q> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    async fn call_read_only(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ChainError> {
        let key = self.key(contract, method, args)?;

        if let Some(value) = self.lookup(&key).await.and_then(|v| v.into_iter().next()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(contract = %contract, method, "Cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = self.inner.call_read_only(contract, method, args).await?;
        self.store(key, vec![value.clone()]).await;
        Ok(value)
    }

    async fn call_read_only_chained(
        &self,
        first: &ReadCall,
        then: FollowUp,
    ) -> Result<ChainedRead, ChainError> {
        let key = format!(
            "chain|{}",
            self.key(&first.contract, &first.method, &first.args)?
        );

        if let Some(values) = self.lookup(&key).await {
            let mut values = values.into_iter();
            if let Some(head) = values.next() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(contract = %first.contract, method = %first.method, "Cache hit (chained)");
                return Ok((head, values.next()));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let (head, tail) = self.inner.call_read_only_chained(first, then).await?;
        let mut values = vec![head.clone()];
        values.extend(tail.clone());
        self.store(key, values).await;
        Ok((head, tail))
    }
}

/// Statistics for the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, including expired ones not yet purged.
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    /// Returns the number of calls seen so far; fails for method `boom`.
    struct CountingQuery {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChainQuery for CountingQuery {
        fn provider(&self) -> &str {
            "counting"
        }

        async fn call_read_only(
            &self,
            contract: &ContractId,
            method: &str,
            _args: &[ClarityValue],
        ) -> Result<ClarityValue, ChainError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if method == "boom" {
                return Err(ChainError::Contract {
                    contract: contract.to_string(),
                    method: method.to_string(),
                    cause: "boom".to_string(),
                });
            }
            Ok(ClarityValue::UInt(u128::from(n)))
        }
    }

    fn cached(config: CacheConfig) -> CachedChainQuery<CountingQuery> {
        CachedChainQuery::new(
            CountingQuery {
                calls: AtomicU32::new(0),
            },
            config,
        )
    }

    fn contract() -> ContractId {
        ContractId::new("SP000000000000000000002Q6VF78", "core")
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = cached(CacheConfig::default());
        let args = [ClarityValue::UInt(7)];

        let first = cache.call_read_only(&contract(), "get-pool", &args).await.unwrap();
        let second = cache.call_read_only(&contract(), "get-pool", &args).await.unwrap();
        assert_eq!(first, second);

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn test_arguments_partition_keys() {
        let cache = cached(CacheConfig::default());
        let a = cache
            .call_read_only(&contract(), "get-pool", &[ClarityValue::UInt(1)])
            .await
            .unwrap();
        let b = cache
            .call_read_only(&contract(), "get-pool", &[ClarityValue::UInt(2)])
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(cache.stats().await.entries, 2);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = cached(CacheConfig {
            ttl: Duration::ZERO,
            capacity: 16,
        });
        cache.call_read_only(&contract(), "m", &[]).await.unwrap();
        cache.call_read_only(&contract(), "m", &[]).await.unwrap();
        assert_eq!(cache.stats().await.misses, 2);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cached(CacheConfig::default());
        assert!(cache.call_read_only(&contract(), "boom", &[]).await.is_err());
        assert!(cache.call_read_only(&contract(), "boom", &[]).await.is_err());
        assert_eq!(cache.stats().await.entries, 0);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = cached(CacheConfig {
            ttl: Duration::from_secs(60),
            capacity: 2,
        });
        for i in 0..3u128 {
            cache
                .call_read_only(&contract(), "get-pool", &[ClarityValue::UInt(i)])
                .await
                .unwrap();
        }
        assert_eq!(cache.stats().await.entries, 2);
    }
    fn supply_call(_: &ClarityValue) -> Option<ReadCall> {
        Some(ReadCall::new(contract(), "get-total-supply", Vec::new()))
    }

    #[tokio::test]
    async fn test_chained_read_is_one_snapshot() {
        let cache = cached(CacheConfig::default());
        let first = ReadCall::new(contract(), "get-pool", vec![ClarityValue::UInt(1)]);

        // a separately cached follow-up must not leak into the chain
        let stale = cache
            .call_read_only(&contract(), "get-total-supply", &[])
            .await
            .unwrap();
        assert_eq!(stale, ClarityValue::UInt(1));

        let (head, tail) = cache.call_read_only_chained(&first, supply_call).await.unwrap();
        assert_eq!(head, ClarityValue::UInt(2));
        assert_eq!(tail, Some(ClarityValue::UInt(3)));

        let again = cache.call_read_only_chained(&first, supply_call).await.unwrap();
        assert_eq!(again, (head, tail));
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.stats().await.entries, 2);
    }

    #[tokio::test]
    async fn test_chained_read_expires_together() {
        let cache = cached(CacheConfig {
            ttl: Duration::ZERO,
            capacity: 16,
        });
        let first = ReadCall::new(contract(), "get-pool", vec![ClarityValue::UInt(1)]);

        cache.call_read_only_chained(&first, supply_call).await.unwrap();
        let (head, tail) = cache.call_read_only_chained(&first, supply_call).await.unwrap();
        assert_eq!(head, ClarityValue::UInt(3));
        assert_eq!(tail, Some(ClarityValue::UInt(4)));
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 4);
    }
}
