//! Address geocoding with a postcode-keyed cache.
//!
//! Malaysian postcodes map to a single town and state, so one lookup per
//! postcode covers every contact sharing it. The cache also rate-limits the
//! upstream API: a minimum delay is enforced between real calls.

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::GeocodeError;

/// Structured result of one address lookup.
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeResult {
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub formatted: String,
}

#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Resolves one free-form address, biased to Malaysia.
    async fn resolve(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError>;
}

/// Google Maps Geocoding API client.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

fn component<'a>(
    components: &'a [serde_json::Value],
    wanted: &str,
) -> Option<&'a serde_json::Value> {
    components.iter().find(|c| {
        c.get("types")
            .and_then(serde_json::Value::as_array)
            .is_some_and(|types| types.iter().any(|t| t.as_str() == Some(wanted)))
    })
}

fn long_name(value: Option<&serde_json::Value>) -> String {
    value
        .and_then(|c| c.get("long_name"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl GeocodeResolver for GoogleGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let url = format!(
            "https://maps.googleapis.com/maps/api/geocode/json?address={}&region=my&key={}",
            urlencoding::encode(address),
            self.api_key
        );
        let body: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        let status = body.get("status").and_then(serde_json::Value::as_str);
        if status == Some("ZERO_RESULTS") {
            return Ok(None);
        }
        if status != Some("OK") {
            return Err(GeocodeError::Transport(format!(
                "Geocoding API status: {}",
                status.unwrap_or("unknown")
            )));
        }

        let Some(result) = body
            .get("results")
            .and_then(serde_json::Value::as_array)
            .and_then(|r| r.first())
        else {
            return Ok(None);
        };

        let empty = Vec::new();
        let components = result
            .get("address_components")
            .and_then(serde_json::Value::as_array)
            .unwrap_or(&empty);
        let location = result.pointer("/geometry/location");
        let coord = |axis: &str| {
            location
                .and_then(|l| l.get(axis))
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0)
        };

        let city = {
            let locality = long_name(component(components, "locality"));
            if locality.is_empty() {
                long_name(component(components, "sublocality"))
            } else {
                locality
            }
        };

        Ok(Some(GeocodeResult {
            city,
            state: long_name(component(components, "administrative_area_level_1")),
            zip: long_name(component(components, "postal_code")),
            country: long_name(component(components, "country")),
            lat: coord("lat"),
            lng: coord("lng"),
            formatted: result
                .get("formatted_address")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }))
    }
}

/// Stand-in used when no Maps API key is configured. Every lookup fails with
/// the setup message instead of a confusing upstream auth error.
pub struct DisabledGeocoder;

#[async_trait]
impl GeocodeResolver for DisabledGeocoder {
    async fn resolve(&self, _address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        Err(GeocodeError::MissingApiKey)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CacheInner {
    entries: HashMap<String, Option<GeocodeResult>>,
    hits: u64,
    misses: u64,
    last_call: Option<Instant>,
}

/// Postcode-keyed lookup cache with upstream throttling.
pub struct GeocodeCache {
    inner: Mutex<CacheInner>,
    min_delay: Duration,
}

impl GeocodeCache {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
                last_call: None,
            }),
            min_delay,
        }
    }

    /// Resolves an address, short-circuiting on a previously seen postcode.
    /// Negative results are cached too. Returns the result and whether it
    /// came from cache.
    pub async fn resolve_cached(
        &self,
        resolver: &Arc<dyn GeocodeResolver>,
        postcode: &str,
        address: &str,
    ) -> Result<(Option<GeocodeResult>, bool), GeocodeError> {
        let key = postcode.trim().to_string();
        if !key.is_empty() {
            let mut inner = self.inner.lock().await;
            if let Some(cached) = inner.entries.get(&key).cloned() {
                inner.hits += 1;
                return Ok((cached, true));
            }
        }

        // Throttle: stay under the upstream rate limit.
        let wait = {
            let inner = self.inner.lock().await;
            inner
                .last_call
                .and_then(|t| self.min_delay.checked_sub(t.elapsed()))
        };
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }

        debug!("geocode cache miss for postcode {key:?}");
        let result = resolver.resolve(address).await?;

        let mut inner = self.inner.lock().await;
        inner.misses += 1;
        inner.last_call = Some(Instant::now());
        if !key.is_empty() {
            inner.entries.insert(key, result.clone());
        }
        Ok((result, false))
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeResolver for CountingResolver {
        async fn resolve(&self, _address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(GeocodeResult {
                city: "Klang".to_string(),
                state: "Selangor".to_string(),
                zip: "41000".to_string(),
                country: "Malaysia".to_string(),
                lat: 3.03,
                lng: 101.45,
                formatted: "Klang, Selangor, Malaysia".to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn same_postcode_hits_cache() {
        let resolver_impl = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let resolver: Arc<dyn GeocodeResolver> = resolver_impl.clone();
        let cache = GeocodeCache::new(Duration::ZERO);

        let (first, from_cache) = cache
            .resolve_cached(&resolver, "41000", "Jalan Satu, 41000 Klang")
            .await
            .unwrap();
        assert!(!from_cache);
        assert_eq!(first.unwrap().state, "Selangor");

        let (_, from_cache) = cache
            .resolve_cached(&resolver, "41000", "Jalan Lain, 41000 Klang")
            .await
            .unwrap();
        assert!(from_cache);
        assert_eq!(resolver_impl.calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn blank_postcode_is_never_cached() {
        let resolver_impl = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let resolver: Arc<dyn GeocodeResolver> = resolver_impl.clone();
        let cache = GeocodeCache::new(Duration::ZERO);

        cache.resolve_cached(&resolver, "", "Jalan Satu").await.unwrap();
        cache.resolve_cached(&resolver, "  ", "Jalan Dua").await.unwrap();

        assert_eq!(resolver_impl.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn clear_empties_entries_and_counters() {
        let resolver: Arc<dyn GeocodeResolver> = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let cache = GeocodeCache::new(Duration::ZERO);
        cache.resolve_cached(&resolver, "41000", "x").await.unwrap();
        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.misses, 0);
    }
}
