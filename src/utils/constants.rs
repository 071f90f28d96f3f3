/// Directory and file names
pub const DATA_DIR: &str = "data";
pub const RAW_DIR: &str = "raw";
pub const CACHE_DIR: &str = "cache";
pub const GEOCODE_CACHE_FILE: &str = "geocode_cache.json";
pub const DISTRICTS_GEOCODED_FILE: &str = "districts_geocoded.csv";
pub const MASTER_FILE: &str = "master.csv";
pub const DEFAULT_SETTINGS_FILE: &str = "collector.toml";

/// Environment
pub const ENV_PREFIX: &str = "BDWX";
pub const API_KEY_ENV: &str = "OWM_API_KEY";

/// Provider endpoints
pub const OWM_ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
pub const OWM_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const OWM_AIR_URL: &str = "https://api.openweathermap.org/data/2.5/air_pollution";
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const WIKI_DISTRICTS_URL: &str = "https://en.wikipedia.org/wiki/Districts_of_Bangladesh";

/// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "bd-districts-collector/1.0";
pub const DEFAULT_COUNTRY: &str = "Bangladesh";

/// Geocoding courtesy limits (Nominatim usage policy: 1 request per second)
pub const GEOCODE_MAX_CALLS: u32 = 1;
pub const GEOCODE_PERIOD_MS: u64 = 1_000;
pub const GEOCODE_MAX_ATTEMPTS: u32 = 3;
pub const GEOCODE_THROTTLE_BACKOFF_MS: u64 = 2_000;

/// Weather/air-quality provider limits (free tier: 60 calls per minute)
pub const METRICS_MAX_CALLS: u32 = 60;
pub const METRICS_PERIOD_MS: u64 = 60_000;
pub const METRICS_MAX_ATTEMPTS: u32 = 5;
pub const METRICS_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const METRICS_MAX_BACKOFF_MS: u64 = 16_000;

/// Asia/Dhaka
pub const DHAKA_UTC_OFFSET_HOURS: i32 = 6;

/// Live reference-page parse is trusted only inside this band (64 districts exist)
pub const MIN_PLAUSIBLE_DISTRICTS: usize = 60;
pub const MAX_PLAUSIBLE_DISTRICTS: usize = 80;

/// Dataset schema, in output order
pub const OBSERVATION_COLUMNS: [&str; 18] = [
    "date",
    "district",
    "division",
    "lat",
    "lon",
    "temp_c",
    "humidity",
    "pressure",
    "wind_speed",
    "clouds",
    "rain",
    "aqi",
    "pm2_5",
    "pm10",
    "o3",
    "no2",
    "so2",
    "co",
];

/// Columns older raw files may carry that are no longer part of the schema
pub const DEPRECATED_COLUMNS: [&str; 1] = ["snow"];

/// Null marker written for missing values
pub const NULL_MARKER: &str = "";

/// Decimal places kept for coordinates in output rows
pub const COORDINATE_PRECISION: i32 = 6;
