//! Flattens provider payloads into `DailyObservation` rows.
//!
//! Two weather shapes are understood: the One Call `current` object and the
//! Current Weather `main`/`wind`/`clouds` layout. Missing or non-numeric
//! fields become nulls; rain defaults to 0.0. Nothing here can fail.

use crate::models::DailyObservation;
use crate::utils::coordinates::round_coordinate;
use chrono::NaiveDate;
use serde_json::Value;

/// Weather measurements common to both payload shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReading {
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub clouds: Option<f64>,
    pub rain: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirQualityReading {
    pub aqi: Option<u32>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AirQuality {
    Reported(AirQualityReading),
    Unavailable { reason: String },
}

impl AirQuality {
    /// Reading to store; unavailable data maps to all-null fields.
    pub fn reading(self) -> AirQualityReading {
        match self {
            AirQuality::Reported(reading) => reading,
            AirQuality::Unavailable { .. } => AirQualityReading::default(),
        }
    }
}

pub fn extract_weather(weather: &Value) -> WeatherReading {
    if let Some(current) = weather.get("current") {
        return WeatherReading {
            temp_c: number(current.get("temp")),
            humidity: number(current.get("humidity")),
            pressure: number(current.get("pressure")),
            wind_speed: number(current.get("wind_speed")),
            clouds: number(current.get("clouds")),
            rain: rain(current.get("rain")),
        };
    }

    WeatherReading {
        temp_c: number(weather.pointer("/main/temp")),
        humidity: number(weather.pointer("/main/humidity")),
        pressure: number(weather.pointer("/main/pressure")),
        wind_speed: number(weather.pointer("/wind/speed")),
        clouds: number(weather.pointer("/clouds/all")),
        rain: rain(weather.get("rain")),
    }
}

pub fn extract_air_quality(air: &Value) -> AirQuality {
    let Some(list) = air.get("list").and_then(Value::as_array) else {
        return AirQuality::Unavailable {
            reason: "payload has no 'list' array".to_string(),
        };
    };
    let Some(first) = list.first() else {
        return AirQuality::Unavailable {
            reason: "empty 'list'".to_string(),
        };
    };

    let component = |name: &str| number(first.get("components").and_then(|c| c.get(name)));

    AirQuality::Reported(AirQualityReading {
        aqi: first
            .pointer("/main/aqi")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok()),
        pm2_5: component("pm2_5"),
        pm10: component("pm10"),
        o3: component("o3"),
        no2: component("no2"),
        so2: component("so2"),
        co: component("co"),
    })
}

pub fn extract_row(
    date: NaiveDate,
    district: &str,
    division: &str,
    lat: f64,
    lon: f64,
    weather: &Value,
    air: &Value,
) -> DailyObservation {
    let w = extract_weather(weather);
    let a = extract_air_quality(air).reading();

    DailyObservation {
        date,
        district: district.to_string(),
        division: division.to_string(),
        lat: round_coordinate(lat),
        lon: round_coordinate(lon),
        temp_c: w.temp_c,
        humidity: w.humidity,
        pressure: w.pressure,
        wind_speed: w.wind_speed,
        clouds: w.clouds,
        rain: w.rain,
        aqi: a.aqi,
        pm2_5: a.pm2_5,
        pm10: a.pm10,
        o3: a.o3,
        no2: a.no2,
        so2: a.so2,
        co: a.co,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// 1-hour rainfall: a bare number or an object with a `1h` field.
fn rain(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Object(map)) => number(map.get("1h")),
        other => number(other),
    }
    .unwrap_or(0.0)
}
