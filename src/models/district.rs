use serde::{Deserialize, Serialize};
use validator::Validate;

/// A district as named by the reference list, with its (possibly empty)
/// administrative division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub name: String,
    pub region: String,
}

impl District {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    /// Key used for the geocode cache and for deduplication.
    pub fn cache_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// One row of `districts_geocoded.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeocodedDistrict {
    #[validate(length(min = 1))]
    pub district: String,

    pub division: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

impl GeocodedDistrict {
    pub fn new(district: String, division: String, lat: f64, lon: f64) -> Self {
        Self {
            district,
            division,
            lat,
            lon,
        }
    }
}
