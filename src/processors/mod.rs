pub mod collector;
pub mod row_extractor;

pub use collector::{
    CollectionRequest, CollectionSummary, Collector, DistrictSource, GeocodingOutcome,
};
pub use row_extractor::{
    extract_air_quality, extract_row, extract_weather, AirQuality, AirQualityReading,
    WeatherReading,
};
