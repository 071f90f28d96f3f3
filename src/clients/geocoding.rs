//! Nominatim geocoding for district names, behind the persistent cache.
//!
//! Cache hits never touch the network or the rate limiter. Misses are
//! limited to one request per second and retried a bounded number of times
//! on HTTP 429.

use crate::cache::{CacheEntry, GeocodeCache};
use crate::clients::clock::Clock;
use crate::clients::rate_limiter::RateLimiter;
use crate::clients::retry::RetryPolicy;
use crate::clients::transport::HttpTransport;
use crate::error::{CollectorError, Result};
use crate::locations::normalize_division;
use crate::models::{District, GeocodedDistrict};
use crate::settings::Settings;
use crate::utils::coordinates::parse_coordinate;
use serde::Deserialize;
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Value,
    lon: Value,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    state: Option<String>,
    region: Option<String>,
}

/// Coordinates and raw region text of the top geocoding match.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub lat: f64,
    pub lon: f64,
    pub region: String,
}

pub struct Geocoder {
    transport: Rc<dyn HttpTransport>,
    clock: Rc<dyn Clock>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    url: String,
    country: String,
    network_calls: u32,
}

impl Geocoder {
    pub fn new(settings: &Settings, transport: Rc<dyn HttpTransport>, clock: Rc<dyn Clock>) -> Self {
        let limiter = RateLimiter::new(
            settings.geocoding.max_calls,
            Duration::from_millis(settings.geocoding.period_ms),
            Rc::clone(&clock),
        );

        Self {
            transport,
            clock,
            limiter,
            retry: RetryPolicy::for_geocoding(&settings.geocoding),
            url: settings.endpoints.geocode_url.clone(),
            country: settings.geocoding.country.clone(),
            network_calls: 0,
        }
    }

    /// Resolve a district to coordinates, from cache when possible.
    ///
    /// `Ok(None)` means the service had no match; nothing is cached so the
    /// district is tried again on the next run.
    pub fn geocode(
        &mut self,
        cache: &mut GeocodeCache,
        district: &District,
    ) -> Result<Option<GeocodedDistrict>> {
        let name = district.name.trim();

        if let Some(entry) = cache.get(name) {
            debug!("Geocode cache hit for {}", name);
            let division = fallback_region(&entry.division, &district.region);
            return Ok(Some(GeocodedDistrict::new(
                name.to_string(),
                normalize_division(name, division),
                entry.lat,
                entry.lon,
            )));
        }

        let Some(found) = self.lookup(name)? else {
            info!("No geocoding match for {}, skipping", name);
            return Ok(None);
        };

        let division = normalize_division(name, fallback_region(&found.region, &district.region));
        let geocoded = GeocodedDistrict::new(name.to_string(), division, found.lat, found.lon);
        geocoded.validate()?;

        cache.put(
            name,
            CacheEntry {
                lat: geocoded.lat,
                lon: geocoded.lon,
                division: geocoded.division.clone(),
            },
        )?;
        debug!(
            "Geocoded {} -> ({:.4}, {:.4}) {}",
            name, geocoded.lat, geocoded.lon, geocoded.division
        );

        Ok(Some(geocoded))
    }

    /// Query the geocoding service directly, bypassing the cache.
    pub fn lookup(&mut self, district_name: &str) -> Result<Option<GeocodeMatch>> {
        let query = vec![
            ("q", format!("{} District, {}", district_name, self.country)),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("addressdetails", "1".to_string()),
        ];

        let Self {
            transport,
            clock,
            limiter,
            retry,
            url,
            network_calls,
            ..
        } = self;
        let url = url.as_str();

        let places: Vec<NominatimPlace> = retry.run(&**clock, |_| {
            limiter.acquire();
            *network_calls += 1;

            let response = transport.get(url, &query)?;
            match response.status {
                429 => Err(CollectorError::TransientStatus {
                    status: 429,
                    url: url.to_string(),
                }),
                _ if response.is_success() => response.json(),
                status => Err(CollectorError::HttpStatus {
                    status,
                    url: url.to_string(),
                }),
            }
        })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let region = [place.address.state, place.address.region]
            .into_iter()
            .flatten()
            .find(|r| !r.trim().is_empty())
            .map(|r| r.replace(" Division", "").trim().to_string())
            .unwrap_or_default();

        Ok(Some(GeocodeMatch {
            lat: coordinate(&place.lat)?,
            lon: coordinate(&place.lon)?,
            region,
        }))
    }

    /// Requests sent to the geocoding service so far, retries included.
    pub fn network_calls(&self) -> u32 {
        self.network_calls
    }
}

fn fallback_region<'a>(primary: &'a str, fallback: &'a str) -> &'a str {
    if primary.trim().is_empty() {
        fallback
    } else {
        primary
    }
}

fn coordinate(value: &Value) -> Result<f64> {
    match value {
        Value::String(s) => parse_coordinate(s),
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            CollectorError::InvalidResponse(format!("Invalid coordinate value: {}", n))
        }),
        other => Err(CollectorError::InvalidResponse(format!(
            "Unexpected coordinate value: {}",
            other
        ))),
    }
}
