pub mod district;
pub mod observation;

pub use district::{District, GeocodedDistrict};
pub use observation::DailyObservation;
