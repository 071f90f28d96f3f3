use crate::utils::constants::{NULL_MARKER, OBSERVATION_COLUMNS};
use crate::utils::coordinates::round_coordinate;
use chrono::NaiveDate;

/// One district's conditions for one collection run, in the fixed
/// 18-column order of `OBSERVATION_COLUMNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub district: String,
    pub division: String,
    pub lat: f64,
    pub lon: f64,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub clouds: Option<f64>,
    /// 1-hour rainfall in mm; 0.0 when the provider reports none
    pub rain: f64,
    pub aqi: Option<u32>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

impl DailyObservation {
    /// Row with every measurement null, used when a district's metrics
    /// could not be fetched.
    pub fn unavailable(
        date: NaiveDate,
        district: &str,
        division: &str,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            date,
            district: district.to_string(),
            division: division.to_string(),
            lat: round_coordinate(lat),
            lon: round_coordinate(lon),
            temp_c: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            clouds: None,
            rain: 0.0,
            aqi: None,
            pm2_5: None,
            pm10: None,
            o3: None,
            no2: None,
            so2: None,
            co: None,
        }
    }

    pub fn has_weather(&self) -> bool {
        self.temp_c.is_some()
            || self.humidity.is_some()
            || self.pressure.is_some()
            || self.wind_speed.is_some()
            || self.clouds.is_some()
    }

    pub fn has_air_quality(&self) -> bool {
        self.aqi.is_some()
    }

    /// CSV fields in schema order, nulls as the null marker.
    pub fn to_record(&self) -> Vec<String> {
        let record = vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.district.clone(),
            self.division.clone(),
            self.lat.to_string(),
            self.lon.to_string(),
            optional(self.temp_c),
            optional(self.humidity),
            optional(self.pressure),
            optional(self.wind_speed),
            optional(self.clouds),
            self.rain.to_string(),
            optional(self.aqi),
            optional(self.pm2_5),
            optional(self.pm10),
            optional(self.o3),
            optional(self.no2),
            optional(self.so2),
            optional(self.co),
        ];
        debug_assert_eq!(record.len(), OBSERVATION_COLUMNS.len());
        record
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NULL_MARKER.to_string())
}
