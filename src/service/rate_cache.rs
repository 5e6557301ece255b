use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::config::PricingConfig;
use crate::dto::pricing_dto::{LiveRatesResponse, MaterialRateItem};
use crate::service::pricing_service::round2;

/// Indian market prices in INR per kg, the source table for the live-cost
/// payload.
const BASE_INR_PRICES_PER_KG: &[(&str, f64)] = &[
    ("Steel", 55.00),
    ("Aluminum", 225.00),
    ("Stainless Steel", 100.00),
    ("Cast Iron", 45.00),
    ("Brass", 400.00),
];

const DEFAULT_MIN_ORDER: &[(&str, i64)] = &[
    ("Steel", 25),
    ("Aluminum", 20),
    ("Stainless Steel", 30),
    ("Cast Iron", 10),
    ("Brass", 15),
];

const RATE_SOURCE: &str = "indian-market-rates";
const CURRENCY: &str = "INR";

fn minimum_order_for(material: &str) -> i64 {
    DEFAULT_MIN_ORDER
        .iter()
        .find(|(name, _)| *name == material)
        .map(|(_, min)| *min)
        .unwrap_or(10)
}

struct CachedRates {
    payload: LiveRatesResponse,
    expires_at: DateTime<Utc>,
}

/// Time-expiring snapshot of the material rate table.
///
/// Constructed once at startup and shared by reference. The recompute
/// branch is the only writer; it is a pure transform of the constant table
/// plus the supplied time, and concurrent recomputes are last-writer-wins.
pub struct MaterialRateCache {
    ttl: Duration,
    default_labor_cost_per_hour: f64,
    default_machine_cost_per_hour: f64,
    state: RwLock<Option<CachedRates>>,
}

impl MaterialRateCache {
    pub fn new(config: &PricingConfig) -> Self {
        MaterialRateCache {
            ttl: Duration::minutes(config.material_price_cache_minutes),
            default_labor_cost_per_hour: config.default_labor_cost_per_hour,
            default_machine_cost_per_hour: config.default_machine_cost_per_hour,
            state: RwLock::new(None),
        }
    }

    /// Current rate payload, recomputed when the cached snapshot has
    /// expired. An optional material-name filter is applied to the returned
    /// copy only; filtering never refreshes or extends the cache.
    pub fn get(&self, now: DateTime<Utc>, materials: Option<&[String]>) -> LiveRatesResponse {
        {
            let state = self.state.read().expect("rate cache lock poisoned");
            if let Some(cached) = state.as_ref() {
                if now < cached.expires_at {
                    debug!("Serving material rates from cache");
                    return Self::filtered(&cached.payload, materials);
                }
            }
        }

        info!("Material rate cache expired, rebuilding payload");
        let payload = self.build_payload(now);

        let mut state = self.state.write().expect("rate cache lock poisoned");
        *state = Some(CachedRates {
            payload: payload.clone(),
            expires_at: now + self.ttl,
        });

        Self::filtered(&payload, materials)
    }

    /// Full payload from the static table. Ids are 1-based table positions.
    fn build_payload(&self, now: DateTime<Utc>) -> LiveRatesResponse {
        let items = BASE_INR_PRICES_PER_KG
            .iter()
            .enumerate()
            .map(|(index, (material, inr_price))| MaterialRateItem {
                id: index as i64 + 1,
                material: material.to_string(),
                cost_per_kg: round2(*inr_price),
                labor_cost_per_hour: round2(self.default_labor_cost_per_hour),
                machine_cost_per_hour: round2(self.default_machine_cost_per_hour),
                minimum_order: minimum_order_for(material),
            })
            .collect();

        LiveRatesResponse {
            updated_at: now,
            source: RATE_SOURCE.to_string(),
            currency: CURRENCY.to_string(),
            items,
        }
    }

    fn filtered(payload: &LiveRatesResponse, materials: Option<&[String]>) -> LiveRatesResponse {
        match materials {
            Some(names) if !names.is_empty() => {
                let items = payload
                    .items
                    .iter()
                    .filter(|item| names.iter().any(|name| name == &item.material))
                    .cloned()
                    .collect();
                LiveRatesResponse {
                    items,
                    ..payload.clone()
                }
            }
            _ => payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_ttl(minutes: i64) -> MaterialRateCache {
        MaterialRateCache::new(&PricingConfig {
            material_price_cache_minutes: minutes,
            default_labor_cost_per_hour: 350.0,
            default_machine_cost_per_hour: 500.0,
        })
    }

    #[test]
    fn test_payload_covers_whole_table() {
        let cache = cache_with_ttl(60);
        let payload = cache.get(Utc::now(), None);
        assert_eq!(payload.items.len(), BASE_INR_PRICES_PER_KG.len());
        assert_eq!(payload.items[0].id, 1);
        assert_eq!(payload.items[0].material, "Steel");
        assert_eq!(payload.items[0].cost_per_kg, 55.0);
        assert_eq!(payload.items[0].minimum_order, 25);
        assert_eq!(payload.currency, "INR");
    }

    #[test]
    fn test_filter_does_not_shrink_cached_payload() {
        let cache = cache_with_ttl(60);
        let now = Utc::now();
        let filtered = cache.get(now, Some(&["Brass".to_string()]));
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.items[0].material, "Brass");

        // The cache kept the full table, not the filtered view.
        let full = cache.get(now, None);
        assert_eq!(full.items.len(), BASE_INR_PRICES_PER_KG.len());
        assert_eq!(full.updated_at, filtered.updated_at);
    }

    #[test]
    fn test_within_ttl_timestamps_are_identical() {
        let cache = cache_with_ttl(60);
        let t0 = Utc::now();
        let first = cache.get(t0, None);
        let second = cache.get(t0 + Duration::minutes(59), None);
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(first, second);
    }

    #[test]
    fn test_after_ttl_timestamp_is_strictly_later() {
        let cache = cache_with_ttl(60);
        let t0 = Utc::now();
        let first = cache.get(t0, None);
        let t1 = t0 + Duration::minutes(61);
        let refreshed = cache.get(t1, None);
        assert!(refreshed.updated_at > first.updated_at);
        assert_eq!(refreshed.updated_at, t1);
    }
}
