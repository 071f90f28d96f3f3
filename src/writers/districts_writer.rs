use crate::error::Result;
use crate::models::GeocodedDistrict;
use crate::utils::atomic::write_atomically;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Write `districts_geocoded.csv`, sorted by district name.
pub fn write_geocoded_districts(path: &Path, districts: &[GeocodedDistrict]) -> Result<()> {
    let mut sorted: Vec<&GeocodedDistrict> = districts.iter().collect();
    sorted.sort_by(|a, b| a.district.cmp(&b.district));

    write_atomically(path, |w: &mut dyn Write| {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(w);
        writer.write_record(["district", "division", "lat", "lon"])?;
        for district in &sorted {
            writer.serialize(district)?;
        }
        writer.flush()?;
        Ok(())
    })?;

    debug!("Wrote {} geocoded districts to {}", sorted.len(), path.display());
    Ok(())
}
