#![allow(dead_code)]

use bd_weather_collector::clients::{Clock, HttpResponse, HttpTransport};
use bd_weather_collector::settings::Settings;
use bd_weather_collector::{CollectorError, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const REFERENCE_URL: &str = "http://reference.test/districts";
pub const GEOCODE_URL: &str = "http://geocode.test/search";
pub const WEATHER_URL: &str = "http://owm.test/weather";
pub const ONECALL_URL: &str = "http://owm.test/onecall";
pub const AIR_URL: &str = "http://owm.test/air_pollution";

pub const PLACE: &str = r#"[{"lat": "23.8103", "lon": "90.4125", "address": {"state": "Dhaka Division"}}]"#;
pub const WEATHER: &str = r#"{"main": {"temp": 30.5, "humidity": 74, "pressure": 1006},
    "wind": {"speed": 2.6}, "clouds": {"all": 40}, "rain": {"1h": 1.2}}"#;
pub const AIR: &str = r#"{"list": [{"main": {"aqi": 3},
    "components": {"pm2_5": 41.2, "pm10": 63.0, "o3": 22.1, "no2": 9.4, "so2": 6.3, "co": 460.6}}]}"#;

/// Settings rooted in a scratch directory, pointing at fake endpoints.
pub fn test_settings(root: &Path) -> Settings {
    let mut settings = Settings::rooted_at(root);
    settings.endpoints.reference_url = REFERENCE_URL.to_string();
    settings.endpoints.geocode_url = GEOCODE_URL.to_string();
    settings.endpoints.weather_url = WEATHER_URL.to_string();
    settings.endpoints.onecall_url = ONECALL_URL.to_string();
    settings.endpoints.air_url = AIR_URL.to_string();
    settings
}

/// Clock that advances only when slept on. Integration tests cannot reach the
/// crate's `#[cfg(test)]` helpers, so this mirrors `clients::testing::ManualClock`.
#[derive(Clone)]
pub struct ManualClock {
    start: Instant,
    elapsed: Rc<Cell<Duration>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
            sleeps: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

/// Transport answering by URL, counting calls per URL. URLs marked
/// unreachable fail with a connection error instead of answering.
pub struct RoutedTransport {
    routes: RefCell<HashMap<String, HttpResponse>>,
    unreachable: RefCell<HashSet<String>>,
    calls: RefCell<HashMap<String, usize>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self {
            routes: RefCell::new(HashMap::new()),
            unreachable: RefCell::new(HashSet::new()),
            calls: RefCell::new(HashMap::new()),
        }
    }

    /// The usual happy path: reference page down, everything else answers.
    pub fn healthy() -> Self {
        let transport = Self::new();
        transport.route(REFERENCE_URL, 503, "");
        transport.route(GEOCODE_URL, 200, PLACE);
        transport.route(WEATHER_URL, 200, WEATHER);
        transport.route(AIR_URL, 200, AIR);
        transport
    }

    pub fn route(&self, url: &str, status: u16, body: &str) {
        self.unreachable.borrow_mut().remove(url);
        self.routes
            .borrow_mut()
            .insert(url.to_string(), HttpResponse::new(status, body));
    }

    pub fn cut_off(&self, url: &str) {
        self.unreachable.borrow_mut().insert(url.to_string());
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().get(url).copied().unwrap_or(0)
    }

    pub fn reset_counts(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl HttpTransport for RoutedTransport {
    fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<HttpResponse> {
        *self.calls.borrow_mut().entry(url.to_string()).or_insert(0) += 1;
        if self.unreachable.borrow().contains(url) {
            return Err(CollectorError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("connection refused: {}", url),
            )));
        }
        Ok(self
            .routes
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "")))
    }
}
