//! Weather and air-quality lookups against OpenWeatherMap.
//!
//! Both endpoints share one rate limiter, so the per-minute budget covers
//! the combined call volume.

use crate::clients::clock::Clock;
use crate::clients::rate_limiter::RateLimiter;
use crate::clients::retry::RetryPolicy;
use crate::clients::transport::HttpTransport;
use crate::error::{CollectorError, Result};
use crate::settings::{Settings, WeatherEndpoint};
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

const ONECALL_EXCLUDE: &str = "minutely,hourly,daily,alerts";

pub struct MetricsClient {
    transport: Rc<dyn HttpTransport>,
    clock: Rc<dyn Clock>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    weather_endpoint: WeatherEndpoint,
    weather_url: String,
    air_url: String,
    network_calls: u32,
}

impl MetricsClient {
    pub fn new(settings: &Settings, transport: Rc<dyn HttpTransport>, clock: Rc<dyn Clock>) -> Self {
        let limiter = RateLimiter::new(
            settings.metrics.max_calls,
            Duration::from_millis(settings.metrics.period_ms),
            Rc::clone(&clock),
        );

        Self {
            transport,
            clock,
            limiter,
            retry: RetryPolicy::for_metrics(&settings.metrics),
            weather_endpoint: settings.endpoints.weather_endpoint,
            weather_url: settings.weather_url().to_string(),
            air_url: settings.endpoints.air_url.clone(),
            network_calls: 0,
        }
    }

    /// Weather payload followed by air-quality payload for one location.
    pub fn fetch_metrics(&mut self, lat: f64, lon: f64, api_key: &str) -> Result<(Value, Value)> {
        let weather = self.fetch_weather(lat, lon, api_key)?;
        let air = self.fetch_air(lat, lon, api_key)?;
        Ok((weather, air))
    }

    pub fn fetch_weather(&mut self, lat: f64, lon: f64, api_key: &str) -> Result<Value> {
        let mut query = location_query(lat, lon, api_key);
        query.push(("units", "metric".to_string()));
        if self.weather_endpoint == WeatherEndpoint::OneCall {
            query.push(("exclude", ONECALL_EXCLUDE.to_string()));
        }

        let url = self.weather_url.clone();
        self.call(&url, &query)
    }

    pub fn fetch_air(&mut self, lat: f64, lon: f64, api_key: &str) -> Result<Value> {
        let query = location_query(lat, lon, api_key);
        let url = self.air_url.clone();
        self.call(&url, &query)
    }

    /// Requests sent so far across both endpoints, retries included.
    pub fn network_calls(&self) -> u32 {
        self.network_calls
    }

    fn call(&mut self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let Self {
            transport,
            clock,
            limiter,
            retry,
            network_calls,
            ..
        } = self;

        retry.run(&**clock, |attempt| {
            limiter.acquire();
            *network_calls += 1;
            debug!("Requesting {} (attempt {})", url, attempt);

            let response = transport.get(url, query)?;
            match response.status {
                _ if response.is_success() => response.json(),
                status if is_transient_status(status) => Err(CollectorError::TransientStatus {
                    status,
                    url: url.to_string(),
                }),
                status => Err(CollectorError::HttpStatus {
                    status,
                    url: url.to_string(),
                }),
            }
        })
    }
}

fn location_query(lat: f64, lon: f64, api_key: &str) -> Vec<(&'static str, String)> {
    vec![
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
        ("appid", api_key.to_string()),
    ]
}

/// Throttling and server-side failures.
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
