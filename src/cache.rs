//! Read-through, write-through memoization of pairwise sire/dam results.
//!
//! The store is an external collaborator behind [`CacheStore`]. Nothing
//! guards against two callers missing the same key at once: both compute,
//! both write, and the last write wins.

use crate::error::{CacheWarning, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Unordered pair of animal identifiers, optionally scoped to the
/// computation it caches.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)`. Keys with different scopes
/// never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    #[serde(default)]
    scope: String,
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        Self::scoped("", a, b)
    }

    pub fn scoped(scope: &str, a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            scope: scope.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn ids(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scope.is_empty() {
            write!(f, "{}/", self.scope)?;
        }
        write!(f, "{}:{}", self.first, self.second)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: PairKey,
    pub computed_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Key/value persistence for cache entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &PairKey) -> Result<Option<CacheEntry>, StoreError>;

    /// Inserts or replaces the entry stored under `entry.key`.
    async fn put(&self, entry: CacheEntry) -> Result<(), StoreError>;
}

/// In-process store, mostly useful for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<PairKey, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &PairKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), StoreError> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Served from the store without computing.
    Hit,
    /// Computed and stored.
    Computed,
    /// Computed, but the store misbehaved; see the warnings.
    Fallback,
}

/// A value returned by [`CompatibilityCache::get_or_compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub computed_at: DateTime<Utc>,
    pub source: CacheSource,
    pub warnings: Vec<CacheWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
}

pub struct CompatibilityCache<S> {
    store: S,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl<S: CacheStore> CompatibilityCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Returns the stored value for `key`, or runs `compute` and stores its
    /// result.
    ///
    /// Store failures never fail the call: the value is computed directly
    /// and the failure is reported in [`Cached::warnings`]. Errors from
    /// `compute` itself are returned as is.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &PairKey, compute: F) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut warnings = vec![];

        match self.store.get(key).await {
            Ok(Some(entry)) => match serde_json::from_value::<T>(entry.payload) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Compatibility cache hit for {}", key);
                    return Ok(Cached {
                        value,
                        computed_at: entry.computed_at,
                        source: CacheSource::Hit,
                        warnings,
                    });
                }
                Err(err) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Discarding undecodable cache entry for {}: {}", key, err);
                    warnings.push(CacheWarning::Decode(err.into()));
                }
            },
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Compatibility cache miss for {}", key);
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Compatibility cache read failed for {}: {}", key, err);
                warnings.push(CacheWarning::Read(err));
            }
        }

        let value = compute().await?;
        let computed_at = Utc::now();

        let written = match serde_json::to_value(&value) {
            Ok(payload) => {
                self.store
                    .put(CacheEntry {
                        key: key.clone(),
                        computed_at,
                        payload,
                    })
                    .await
            }
            Err(err) => Err(err.into()),
        };
        if let Err(err) = written {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!("Compatibility cache write failed for {}: {}", key, err);
            warnings.push(CacheWarning::Write(err));
        }

        let source = if warnings.is_empty() {
            CacheSource::Computed
        } else {
            CacheSource::Fallback
        };
        Ok(Cached {
            value,
            computed_at,
            source,
            warnings,
        })
    }
}
