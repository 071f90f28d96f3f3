use crate::error::Result;
use crate::models::GeocodedDistrict;
use csv::ReaderBuilder;
use std::path::Path;
use validator::Validate;

/// Read `districts_geocoded.csv` (`district,division,lat,lon`).
pub fn read_geocoded_districts(path: &Path) -> Result<Vec<GeocodedDistrict>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut districts = Vec::new();

    for result in reader.deserialize() {
        let district: GeocodedDistrict = result?;
        district.validate()?;
        districts.push(district);
    }

    Ok(districts)
}
