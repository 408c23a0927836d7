//! Signing keys published by the identity provider (JWKS).
//!
//! `KeySetResolver` owns the only shared mutable state of the auth pipeline:
//! a cached `KeySet`. Readers hit the cache; misses (unknown `kid`, empty
//! cache, expired freshness window) funnel into a single in-flight refresh
//! that every concurrent caller awaits.
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySetError {
    #[error("key set transport error: {0}")]
    Transport(String),
    #[error("key set endpoint returned status {0}")]
    Status(u16),
    #[error("malformed key set document: {0}")]
    Document(String),
    #[error("key set fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// One verification key, addressed by `kid`.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct KeyRecord {
    pub kid: String,
    pub alg: Option<String>,
    key: DecodingKey,
}

impl KeyRecord {
    /// Build an RSA key from base64url-encoded modulus and exponent.
    pub fn from_rsa_components(
        kid: impl Into<String>,
        alg: Option<String>,
        n: &str,
        e: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            kid: kid.into(),
            alg,
            key: DecodingKey::from_rsa_components(n, e)?,
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    /// A key without a declared `alg` is usable for any algorithm of its family.
    pub fn accepts(&self, alg: &str) -> bool {
        self.alg.as_deref().is_none_or(|declared| declared == alg)
    }
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .finish()
    }
}

/// Ordered keys with unique `kid`s.
#[derive(Clone, Debug, Default)]
pub struct KeySet {
    keys: Vec<Arc<KeyRecord>>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kty: String,
    kid: Option<String>,
    alg: Option<String>,
    #[serde(rename = "use")]
    key_use: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

impl KeySet {
    /// Later records with an already-seen `kid` are dropped.
    pub fn new(records: impl IntoIterator<Item = KeyRecord>) -> Self {
        let mut keys: Vec<Arc<KeyRecord>> = Vec::new();
        for record in records {
            if keys.iter().any(|k| k.kid == record.kid) {
                warn!(kid = %record.kid, "duplicate kid in key set; keeping the first entry");
                continue;
            }
            keys.push(Arc::new(record));
        }
        Self { keys }
    }

    /// Parse a key-discovery document (`{"keys": [...]}`).
    ///
    /// Entries that cannot be used for RSA signature verification are skipped.
    pub fn from_document(body: &[u8]) -> Result<Self, KeySetError> {
        let doc: JwksDocument =
            serde_json::from_slice(body).map_err(|e| KeySetError::Document(e.to_string()))?;

        let records = doc.keys.into_iter().filter_map(|raw| {
            let entry: JwkEntry = match serde_json::from_value(raw) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable JWK entry");
                    return None;
                }
            };
            record_from_entry(entry)
        });

        Ok(Self::new(records))
    }

    pub fn find(&self, kid: &str) -> Option<Arc<KeyRecord>> {
        self.keys.iter().find(|k| k.kid == kid).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn record_from_entry(entry: JwkEntry) -> Option<KeyRecord> {
    if entry.kty != "RSA" {
        debug!(kty = %entry.kty, "skipping non-RSA JWK");
        return None;
    }
    if entry.key_use.as_deref().is_some_and(|u| u != "sig") {
        debug!(kid = ?entry.kid, "skipping JWK not meant for signatures");
        return None;
    }
    let (Some(kid), Some(n), Some(e)) = (entry.kid, entry.n, entry.e) else {
        warn!("skipping RSA JWK without kid/n/e");
        return None;
    };
    match KeyRecord::from_rsa_components(kid.clone(), entry.alg, &n, &e) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(kid = %kid, error = %err, "skipping JWK with invalid RSA components");
            None
        }
    }
}

/// Where a fresh `KeySet` comes from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<KeySet, KeySetError>;
}

/// Fetches the key-discovery document over HTTPS.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySource {
    /// `allow_http` lifts the HTTPS-only restriction (local development, tests).
    pub fn new(url: Url, timeout: Duration, allow_http: bool) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .https_only(!allow_http)
            .build()
            .map_err(|e| KeySetError::Transport(e.to_string()))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<KeySet, KeySetError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| KeySetError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KeySetError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| KeySetError::Transport(e.to_string()))?;

        KeySet::from_document(&body)
    }
}

struct CachedKeySet {
    keys: KeySet,
    fetched_at: Instant,
}

pub struct KeySetResolver {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    fetch_timeout: Duration,
    cache: RwLock<Option<CachedKeySet>>,
    // Held for the duration of a refresh; remembers how the latest attempt ended.
    last_refresh: Mutex<Option<KeySetError>>,
    // Bumped after every completed refresh attempt.
    generation: AtomicU64,
}

impl std::fmt::Debug for KeySetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetResolver")
            .field("ttl", &self.ttl)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl KeySetResolver {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            cache: RwLock::new(None),
            last_refresh: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve a key by `kid` that accepts `alg`.
    ///
    /// A cached `kid` declared for another algorithm counts as a miss.
    ///
    /// - `Ok(Some(_))`: found in a fresh cache, or after a refresh
    /// - `Ok(None)`: still unknown after one refresh
    /// - `Err(_)`: the refresh this call depended on failed
    pub async fn find(&self, kid: &str, alg: &str) -> Result<Option<Arc<KeyRecord>>, KeySetError> {
        // Read before looking at the cache so a refresh finishing in between is noticed.
        let generation = self.generation.load(Ordering::Acquire);

        if let Some(key) = self.cached(kid, alg).await {
            return Ok(Some(key));
        }

        self.refresh(generation).await?;

        let cache = self.cache.read().await;
        Ok(cache
            .as_ref()
            .and_then(|c| c.keys.find(kid))
            .filter(|key| key.accepts(alg)))
    }

    /// Install a key set directly, as if it had just been fetched.
    pub async fn prime(&self, keys: KeySet) {
        *self.cache.write().await = Some(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
        });
    }

    /// Drop cached keys; the next lookup refetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn cached(&self, kid: &str, alg: &str) -> Option<Arc<KeyRecord>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .and_then(|c| c.keys.find(kid))
            .filter(|key| key.accepts(alg))
    }

    async fn refresh(&self, seen_generation: u64) -> Result<(), KeySetError> {
        let mut last_refresh = self.last_refresh.lock().await;

        if self.generation.load(Ordering::Acquire) != seen_generation {
            // Someone refreshed while we queued; share their outcome.
            return match last_refresh.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            };
        }

        debug!("refreshing signing key set");
        let outcome = match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(KeySetError::Timeout(self.fetch_timeout)),
        };

        let result = match outcome {
            Ok(keys) => {
                debug!(keys = keys.len(), "signing key set refreshed");
                *self.cache.write().await = Some(CachedKeySet {
                    keys,
                    fetched_at: Instant::now(),
                });
                *last_refresh = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "signing key set refresh failed; previous keys kept");
                *last_refresh = Some(err.clone());
                Err(err)
            }
        };

        self.generation.fetch_add(1, Ordering::AcqRel);
        result
    }
}
