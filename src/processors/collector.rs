//! One collection run: districts -> coordinates -> metrics -> raw file ->
//! master rebuild.

use crate::cache::GeocodeCache;
use crate::clients::{Clock, Geocoder, HttpTransport, MetricsClient};
use crate::error::Result;
use crate::locations::{LocationResolver, ResolutionSource};
use crate::models::{DailyObservation, GeocodedDistrict};
use crate::processors::row_extractor::extract_row;
use crate::readers::read_geocoded_districts;
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_geocoded_districts, DatasetWriter, DuplicatePolicy, MasterSummary};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CollectionRequest {
    pub date: NaiveDate,
    pub api_key: String,
    pub rebuild_geocode: bool,
    /// Collect only the first N districts
    pub limit: Option<usize>,
    pub duplicate_policy: DuplicatePolicy,
    pub show_progress: bool,
}

/// Where the run's district list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistrictSource {
    /// Existing `districts_geocoded.csv`
    Reused,
    /// Freshly resolved and geocoded
    Resolved(ResolutionSource),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingOutcome {
    pub districts: Vec<GeocodedDistrict>,
    pub source: DistrictSource,
    /// Names that could not be geocoded this run
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    pub date: NaiveDate,
    pub raw_path: PathBuf,
    pub rows_written: usize,
    pub district_source: DistrictSource,
    pub unresolved_districts: Vec<String>,
    /// Districts written with null metrics
    pub failed_districts: Vec<String>,
    pub master: MasterSummary,
}

pub struct Collector {
    settings: Settings,
    transport: Rc<dyn HttpTransport>,
    clock: Rc<dyn Clock>,
}

impl Collector {
    pub fn new(settings: Settings, transport: Rc<dyn HttpTransport>, clock: Rc<dyn Clock>) -> Self {
        Self {
            settings,
            transport,
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ensure_directories(&self) -> Result<()> {
        let paths = &self.settings.paths;
        for dir in [&paths.data_dir, &paths.raw_dir, &paths.cache_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn run(&self, request: &CollectionRequest) -> Result<CollectionSummary> {
        self.ensure_directories()?;

        let geocoding = self.geocoded_districts(request.rebuild_geocode, request.show_progress)?;
        let mut districts = geocoding.districts;
        if let Some(limit) = request.limit.filter(|n| *n > 0) {
            districts.truncate(limit);
        }

        let (rows, failed_districts) = self.collect_observations(
            request.date,
            &districts,
            &request.api_key,
            request.show_progress,
        );

        let writer = DatasetWriter::new(&self.settings.paths.raw_dir, &self.settings.paths.master_csv)
            .with_duplicate_policy(request.duplicate_policy);
        let raw_path = writer.write_day(request.date, &rows)?;
        let master = writer.rebuild_master()?;

        Ok(CollectionSummary {
            date: request.date,
            raw_path,
            rows_written: rows.len(),
            district_source: geocoding.source,
            unresolved_districts: geocoding.unresolved,
            failed_districts,
            master,
        })
    }

    /// Geocoded districts for this run. The districts file is reused when
    /// present unless `rebuild` is set; otherwise the list is resolved,
    /// geocoded through the cache and written back sorted by name. The file
    /// is only written when every district resolved.
    pub fn geocoded_districts(&self, rebuild: bool, show_progress: bool) -> Result<GeocodingOutcome> {
        let districts_csv = &self.settings.paths.districts_csv;
        if !rebuild && districts_csv.exists() {
            let districts = read_geocoded_districts(districts_csv)?;
            info!(
                "Using {} geocoded districts from {}",
                districts.len(),
                districts_csv.display()
            );
            return Ok(GeocodingOutcome {
                districts,
                source: DistrictSource::Reused,
                unresolved: Vec::new(),
            });
        }

        let resolution = LocationResolver::new(&self.settings, Rc::clone(&self.transport)).resolve();
        let mut cache = GeocodeCache::load(&self.settings.paths.geocode_cache)?;
        let mut geocoder = Geocoder::new(
            &self.settings,
            Rc::clone(&self.transport),
            Rc::clone(&self.clock),
        );

        let progress = ProgressReporter::new(
            resolution.districts.len() as u64,
            "Geocoding districts...",
            !show_progress,
        );
        let mut geocoded = Vec::with_capacity(resolution.districts.len());
        let mut unresolved = Vec::new();

        for district in &resolution.districts {
            match geocoder.geocode(&mut cache, district) {
                Ok(Some(found)) => geocoded.push(found),
                Ok(None) => unresolved.push(district.name.clone()),
                Err(e) => {
                    warn!("Geocoding failed for {}: {}", district.name, e);
                    unresolved.push(district.name.clone());
                }
            }
            progress.increment(1);
        }
        progress.finish_with_message(&format!(
            "Geocoded {} of {} districts",
            geocoded.len(),
            resolution.districts.len()
        ));

        geocoded.sort_by(|a, b| a.district.cmp(&b.district));
        if unresolved.is_empty() {
            write_geocoded_districts(districts_csv, &geocoded)?;
        } else {
            // A partial list is never persisted, so the next run resolves
            // again and only the missing names reach the geocoder.
            warn!(
                "{} districts unresolved, not writing {}",
                unresolved.len(),
                districts_csv.display()
            );
            if districts_csv.exists() {
                fs::remove_file(districts_csv)?;
            }
        }
        info!(
            "Geocoded {} districts ({} network calls, {} cached)",
            geocoded.len(),
            geocoder.network_calls(),
            cache.len()
        );

        Ok(GeocodingOutcome {
            districts: geocoded,
            source: DistrictSource::Resolved(resolution.source),
            unresolved,
        })
    }

    /// Fetch and flatten metrics for each district. A district whose
    /// metrics cannot be fetched still gets a row, with null measurements.
    pub fn collect_observations(
        &self,
        date: NaiveDate,
        districts: &[GeocodedDistrict],
        api_key: &str,
        show_progress: bool,
    ) -> (Vec<DailyObservation>, Vec<String>) {
        let mut metrics = MetricsClient::new(
            &self.settings,
            Rc::clone(&self.transport),
            Rc::clone(&self.clock),
        );
        let progress = ProgressReporter::new(
            districts.len() as u64,
            &format!("Collecting {} districts for {}...", districts.len(), date),
            !show_progress,
        );

        let mut rows = Vec::with_capacity(districts.len());
        let mut failed = Vec::new();

        for d in districts {
            progress.set_message(&format!("Collecting {}", d.district));
            let row = match metrics.fetch_metrics(d.lat, d.lon, api_key) {
                Ok((weather, air)) => {
                    let row = extract_row(date, &d.district, &d.division, d.lat, d.lon, &weather, &air);
                    if !row.has_weather() {
                        debug!("Weather payload for {} had no readings", d.district);
                    }
                    if !row.has_air_quality() {
                        debug!("No air quality reading for {}", d.district);
                    }
                    row
                }
                Err(e) => {
                    warn!("Metrics unavailable for {}: {}", d.district, e);
                    failed.push(d.district.clone());
                    DailyObservation::unavailable(date, &d.district, &d.division, d.lat, d.lon)
                }
            };
            rows.push(row);
            progress.increment(1);
        }
        progress.finish_with_message(&format!("Collected {} districts", rows.len()));

        info!(
            "Collected {} rows for {} ({} with null metrics, {} API calls)",
            rows.len(),
            date,
            failed.len(),
            metrics.network_calls()
        );
        (rows, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::{ManualClock, ScriptedTransport};
    use crate::utils::constants::OBSERVATION_COLUMNS;
    use tempfile::TempDir;

    const WEATHER: &str = r#"{"main": {"temp": 30.0, "humidity": 70, "pressure": 1005},
        "wind": {"speed": 3.0}, "clouds": {"all": 20}}"#;
    const AIR: &str = r#"{"list": [{"main": {"aqi": 2}, "components": {"pm2_5": 12.0}}]}"#;

    fn collector(dir: &TempDir, transport: &Rc<ScriptedTransport>) -> Collector {
        Collector::new(
            Settings::rooted_at(dir.path()),
            transport.clone(),
            Rc::new(ManualClock::new()),
        )
    }

    fn seed_districts(collector: &Collector) {
        collector.ensure_directories().unwrap();
        fs::write(
            &collector.settings().paths.districts_csv,
            "district,division,lat,lon\nBogura,Rajshahi,24.85,89.37\nDhaka,Dhaka,23.81,90.41\nSylhet,Sylhet,24.89,91.87\n",
        )
        .unwrap();
    }

    fn request(limit: Option<usize>) -> CollectionRequest {
        CollectionRequest {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            api_key: "key".to_string(),
            rebuild_geocode: false,
            limit,
            duplicate_policy: DuplicatePolicy::KeepAll,
            show_progress: false,
        }
    }

    #[test]
    fn test_reuses_districts_file_without_network() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::always(500, ""));
        let collector = collector(&dir, &transport);
        seed_districts(&collector);

        let outcome = collector.geocoded_districts(false, false).unwrap();

        assert_eq!(outcome.source, DistrictSource::Reused);
        assert_eq!(outcome.districts.len(), 3);
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_run_writes_raw_and_master() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::new(vec![
            crate::clients::HttpResponse::new(200, WEATHER),
            crate::clients::HttpResponse::new(200, AIR),
            crate::clients::HttpResponse::new(200, WEATHER),
            crate::clients::HttpResponse::new(200, AIR),
        ]));
        let collector = collector(&dir, &transport);
        seed_districts(&collector);

        let summary = collector.run(&request(Some(2))).unwrap();

        assert_eq!(summary.rows_written, 2);
        assert!(summary.failed_districts.is_empty());
        assert_eq!(summary.raw_path, dir.path().join("data/raw/2024-06-01.csv"));
        assert_eq!(summary.master.rows, 2);
        assert_eq!(transport.call_count(), 4);

        let raw = fs::read_to_string(&summary.raw_path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines[0], OBSERVATION_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "2024-06-01,Bogura,Rajshahi,24.85,89.37,30,70,1005,3,20,0,2,12,,,,,"
        );
    }

    #[test]
    fn test_failed_district_gets_null_row() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::always(401, r#"{"cod": 401}"#));
        let collector = collector(&dir, &transport);
        seed_districts(&collector);

        let summary = collector.run(&request(None)).unwrap();

        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.failed_districts, vec!["Bogura", "Dhaka", "Sylhet"]);
        let raw = fs::read_to_string(&summary.raw_path).unwrap();
        assert!(raw.contains("2024-06-01,Dhaka,Dhaka,23.81,90.41,,,,,,0,,,,,,,"));
    }

    #[test]
    fn test_zero_limit_means_no_cap() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::always(401, ""));
        let collector = collector(&dir, &transport);
        seed_districts(&collector);

        let summary = collector.run(&request(Some(0))).unwrap();

        assert_eq!(summary.rows_written, 3);
    }

    #[test]
    fn test_unreachable_provider_gives_null_row() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::unreachable());
        let collector = collector(&dir, &transport);
        let districts = vec![GeocodedDistrict::new(
            "Khulna".to_string(),
            "Khulna".to_string(),
            22.8456,
            89.5403,
        )];
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let (rows, failed) = collector.collect_observations(date, &districts, "key", false);

        assert_eq!(failed, vec!["Khulna"]);
        assert_eq!(
            rows,
            vec![DailyObservation::unavailable(date, "Khulna", "Khulna", 22.8456, 89.5403)]
        );
        // Connection failures are not retried
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_partial_geocoding_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let transport = Rc::new(ScriptedTransport::unreachable());
        let collector = collector(&dir, &transport);
        collector.ensure_directories().unwrap();
        let districts_csv = collector.settings().paths.districts_csv.clone();
        fs::write(&districts_csv, "district,division,lat,lon\nDhaka,Dhaka,23.81,90.41\n").unwrap();

        let outcome = collector.geocoded_districts(true, false).unwrap();

        assert!(outcome.districts.is_empty());
        assert_eq!(outcome.unresolved.len(), 64);
        assert!(!districts_csv.exists());
    }
}
