//! Caching layer for mapping API responses.
//!
//! The same station → destination transit leg is queried once per address
//! in a batch, and addresses often repeat between morning and evening
//! runs. Successful responses are cached by their full query; failures
//! are never cached so a later row can still succeed.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Coordinates, LegEstimate, LegTiming, Location, Station, TravelMode};
use crate::maps::MapsError;
use crate::planner::MapsProvider;

/// Cache key for legs: (mode, origin query, destination query, timing).
type LegKey = (TravelMode, String, String, LegTiming);

/// Cache key for station searches: (centre "lat,lng", radius in metres).
type StationsKey = (String, u32);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_capacity: 10_000,
        }
    }
}

/// Any `MapsProvider` with caching.
///
/// Wraps a provider and caches leg estimates, geocodes and station
/// searches.
pub struct CachedMapsClient<P> {
    inner: P,
    legs: MokaCache<LegKey, LegEstimate>,
    geocodes: MokaCache<String, Coordinates>,
    stations: MokaCache<StationsKey, Arc<Vec<Station>>>,
}

impl<P: MapsProvider> CachedMapsClient<P> {
    /// Create a new cached client.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        Self {
            inner,
            legs: build_cache(config),
            geocodes: build_cache(config),
            stations: build_cache(config),
        }
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached legs.
    pub async fn leg_entry_count(&self) -> u64 {
        self.legs.run_pending_tasks().await;
        self.legs.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.legs.invalidate_all();
        self.geocodes.invalidate_all();
        self.stations.invalidate_all();
    }

    async fn cached_leg(
        &self,
        mode: TravelMode,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        let key = (mode, origin.to_query(), destination.to_query(), timing);

        // Try cache first
        if let Some(cached) = self.legs.get(&key).await {
            trace!(%mode, %origin, %destination, "leg cache hit");
            return Ok(cached);
        }

        let leg = match mode {
            TravelMode::Driving => {
                self.inner
                    .driving_estimate(origin, destination, timing)
                    .await?
            }
            TravelMode::Transit => {
                self.inner
                    .transit_estimate(origin, destination, timing)
                    .await?
            }
        };

        self.legs.insert(key, leg.clone()).await;

        Ok(leg)
    }
}

fn build_cache<K, V>(config: &CacheConfig) -> MokaCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    MokaCache::builder()
        .time_to_live(config.ttl)
        .max_capacity(config.max_capacity)
        .build()
}

impl<P: MapsProvider> MapsProvider for CachedMapsClient<P> {
    async fn driving_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        self.cached_leg(TravelMode::Driving, origin, destination, timing)
            .await
    }

    async fn transit_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        self.cached_leg(TravelMode::Transit, origin, destination, timing)
            .await
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, MapsError> {
        if let Some(cached) = self.geocodes.get(address).await {
            return Ok(cached);
        }

        let coords = self.inner.geocode(address).await?;
        self.geocodes.insert(address.to_string(), coords).await;
        Ok(coords)
    }

    async fn nearby_stations(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Station>, MapsError> {
        let key = (center.to_string(), radius_m);
        if let Some(cached) = self.stations.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let stations = self.inner.nearby_stations(center, radius_m).await?;
        self.stations.insert(key, Arc::new(stations.clone())).await;
        Ok(stations)
    }
}
