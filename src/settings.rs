//! Layered runtime settings: built-in defaults, then an optional TOML file,
//! then `BDWX__`-prefixed environment variables
//! (e.g. `BDWX__METRICS__MAX_ATTEMPTS=3`).

use crate::error::{CollectorError, Result};
use crate::utils::constants::*;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub paths: PathSettings,
    pub endpoints: EndpointSettings,
    pub http: HttpSettings,
    pub geocoding: GeocodingSettings,
    pub metrics: MetricsSettings,
    /// Offset used to decide "today" when no date is given (Asia/Dhaka has no DST)
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub geocode_cache: PathBuf,
    pub districts_csv: PathBuf,
    pub master_csv: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherEndpoint {
    /// Current Weather 2.5: top-level `main`/`wind`/`clouds`
    Current,
    /// One Call 3.0: nested `current` object
    OneCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub weather_url: String,
    pub onecall_url: String,
    pub air_url: String,
    pub geocode_url: String,
    pub reference_url: String,
    pub weather_endpoint: WeatherEndpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingSettings {
    pub country: String,
    pub max_calls: u32,
    pub period_ms: u64,
    pub max_attempts: u32,
    pub throttle_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    pub max_calls: u32,
    pub period_ms: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl PathSettings {
    /// Default file layout below the given data and cache directories.
    pub fn under(data_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            raw_dir: data_dir.join(RAW_DIR),
            geocode_cache: cache_dir.join(GEOCODE_CACHE_FILE),
            districts_csv: data_dir.join(DISTRICTS_GEOCODED_FILE),
            master_csv: data_dir.join(MASTER_FILE),
            data_dir,
            cache_dir,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Default for Settings {
    fn default() -> Self {
        Self::rooted_at(Path::new(""))
    }
}

impl Settings {
    /// Defaults with all data and cache paths placed under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            paths: PathSettings::under(root.join(DATA_DIR), root.join(CACHE_DIR)),
            endpoints: EndpointSettings {
                weather_url: OWM_WEATHER_URL.to_string(),
                onecall_url: OWM_ONECALL_URL.to_string(),
                air_url: OWM_AIR_URL.to_string(),
                geocode_url: NOMINATIM_URL.to_string(),
                reference_url: WIKI_DISTRICTS_URL.to_string(),
                weather_endpoint: WeatherEndpoint::Current,
            },
            http: HttpSettings {
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            geocoding: GeocodingSettings {
                country: DEFAULT_COUNTRY.to_string(),
                max_calls: GEOCODE_MAX_CALLS,
                period_ms: GEOCODE_PERIOD_MS,
                max_attempts: GEOCODE_MAX_ATTEMPTS,
                throttle_backoff_ms: GEOCODE_THROTTLE_BACKOFF_MS,
            },
            metrics: MetricsSettings {
                max_calls: METRICS_MAX_CALLS,
                period_ms: METRICS_PERIOD_MS,
                max_attempts: METRICS_MAX_ATTEMPTS,
                initial_backoff_ms: METRICS_INITIAL_BACKOFF_MS,
                max_backoff_ms: METRICS_MAX_BACKOFF_MS,
            },
            utc_offset_hours: DHAKA_UTC_OFFSET_HOURS,
        }
    }

    /// Load settings. An explicit `path` must exist; otherwise
    /// `collector.toml` in the working directory is used when present.
    ///
    /// Paths not set explicitly follow `paths.data_dir` and `paths.cache_dir`,
    /// so moving the data directory moves the raw files and master with it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::from(PathBuf::from(DEFAULT_SETTINGS_FILE)).required(false),
        };

        let overrides = Config::builder()
            .add_source(file.clone())
            .add_source(environment())
            .build()?;
        let mut defaults = Settings::default();
        let data_dir = overrides
            .get::<PathBuf>("paths.data_dir")
            .unwrap_or(defaults.paths.data_dir);
        let cache_dir = overrides
            .get::<PathBuf>("paths.cache_dir")
            .unwrap_or(defaults.paths.cache_dir);
        defaults.paths = PathSettings::under(data_dir, cache_dir);

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(file)
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("endpoints.weather_url", &self.endpoints.weather_url),
            ("endpoints.onecall_url", &self.endpoints.onecall_url),
            ("endpoints.air_url", &self.endpoints.air_url),
            ("endpoints.geocode_url", &self.endpoints.geocode_url),
            ("endpoints.reference_url", &self.endpoints.reference_url),
        ];
        for (name, url) in urls {
            if url.trim().is_empty() {
                return Err(CollectorError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.geocoding.max_calls == 0 || self.metrics.max_calls == 0 {
            return Err(CollectorError::Config(
                "rate limits must allow at least one call per period".to_string(),
            ));
        }
        if self.geocoding.max_attempts == 0 || self.metrics.max_attempts == 0 {
            return Err(CollectorError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.metrics.max_backoff_ms < self.metrics.initial_backoff_ms {
            return Err(CollectorError::Config(format!(
                "metrics.max_backoff_ms ({}) is below metrics.initial_backoff_ms ({})",
                self.metrics.max_backoff_ms, self.metrics.initial_backoff_ms
            )));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(CollectorError::Config(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            )));
        }

        Ok(())
    }

    /// URL of the weather endpoint currently selected.
    pub fn weather_url(&self) -> &str {
        match self.endpoints.weather_endpoint {
            WeatherEndpoint::Current => &self.endpoints.weather_url,
            WeatherEndpoint::OneCall => &self.endpoints.onecall_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.metrics.max_calls, 60);
        assert_eq!(settings.metrics.max_attempts, 5);
        assert_eq!(settings.geocoding.max_calls, 1);
        assert_eq!(settings.paths.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(
            settings.paths.geocode_cache,
            PathBuf::from("cache/geocode_cache.json")
        );
    }

    #[test]
    fn test_rooted_paths() {
        let settings = Settings::rooted_at(Path::new("/tmp/run"));
        assert_eq!(settings.paths.master_csv, PathBuf::from("/tmp/run/data/master.csv"));
        assert_eq!(
            settings.paths.districts_csv,
            PathBuf::from("/tmp/run/data/districts_geocoded.csv")
        );
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "utc_offset_hours = 5")?;
        writeln!(file, "[metrics]")?;
        writeln!(file, "max_attempts = 3")?;
        writeln!(file, "[endpoints]")?;
        writeln!(file, "weather_endpoint = \"onecall\"")?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.metrics.max_attempts, 3);
        assert_eq!(settings.metrics.max_calls, 60);
        assert_eq!(settings.utc_offset_hours, 5);
        assert_eq!(settings.weather_url(), OWM_ONECALL_URL);
        Ok(())
    }

    #[test]
    fn test_data_dir_moves_derived_paths() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[paths]")?;
        writeln!(file, "data_dir = \"/srv/bd\"")?;
        writeln!(file, "master_csv = \"/exports/all.csv\"")?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.paths.raw_dir, PathBuf::from("/srv/bd/raw"));
        assert_eq!(
            settings.paths.districts_csv,
            PathBuf::from("/srv/bd/districts_geocoded.csv")
        );
        assert_eq!(settings.paths.master_csv, PathBuf::from("/exports/all.csv"));
        assert_eq!(
            settings.paths.geocode_cache,
            PathBuf::from("cache/geocode_cache.json")
        );
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_bounds_are_checked() {
        let mut settings = Settings::default();
        settings.metrics.max_backoff_ms = 10;
        assert!(matches!(settings.validate(), Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut settings = Settings::default();
        settings.geocoding.max_calls = 0;
        assert!(settings.validate().is_err());
    }
}
