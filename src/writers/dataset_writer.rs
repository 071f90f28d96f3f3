use crate::error::Result;
use crate::models::DailyObservation;
use crate::readers::raw_reader::{read_raw_file, RawFileOutcome};
use crate::utils::atomic::write_atomically;
use crate::utils::constants::OBSERVATION_COLUMNS;
use crate::utils::filename::{is_csv_file, raw_file_path};
use chrono::NaiveDate;
use csv::{StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do with rows sharing a `(date, district)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep every row; re-running a day duplicates its rows.
    #[default]
    KeepAll,
    /// Keep one row per key; a later row replaces the earlier one in place.
    LatestWins,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub files_loaded: usize,
    pub duplicates_replaced: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Writes the dated raw files and rebuilds the master dataset from them.
pub struct DatasetWriter {
    raw_dir: PathBuf,
    master_path: PathBuf,
    duplicate_policy: DuplicatePolicy,
}

impl DatasetWriter {
    pub fn new(raw_dir: impl Into<PathBuf>, master_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            master_path: master_path.into(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Append `rows` to the raw file for `date` and return its path.
    ///
    /// Existing rows are read back through the same reconciliation as the
    /// master rebuild, so a file with an older header is rewritten in the
    /// current schema. An unreadable existing file is replaced.
    pub fn write_day(&self, date: NaiveDate, rows: &[DailyObservation]) -> Result<PathBuf> {
        fs::create_dir_all(&self.raw_dir)?;
        let path = raw_file_path(&self.raw_dir, date);

        let mut records = if path.exists() {
            match read_raw_file(&path) {
                RawFileOutcome::Loaded(existing) => {
                    debug!(
                        "Appending {} rows to {} existing rows in {}",
                        rows.len(),
                        existing.records.len(),
                        path.display()
                    );
                    existing.records
                }
                RawFileOutcome::Skipped { reason, .. } => {
                    warn!("Replacing unreadable raw file {}: {}", path.display(), reason);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        records.extend(rows.iter().map(|row| StringRecord::from(row.to_record())));

        let (records, replaced) = apply_policy(records, self.duplicate_policy);
        if replaced > 0 {
            debug!("Replaced {} duplicate rows in {}", replaced, path.display());
        }

        write_records(&path, &records)?;
        Ok(path)
    }

    /// Raw `.csv` files, sorted by file name.
    pub fn raw_files(&self) -> Result<Vec<PathBuf>> {
        if !self.raw_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.raw_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_csv_file(path))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Rebuild the master file from every raw file. Malformed raw files
    /// are skipped and reported; they never abort the rebuild.
    pub fn rebuild_master(&self) -> Result<MasterSummary> {
        let mut records = Vec::new();
        let mut files_loaded = 0;
        let mut skipped = Vec::new();

        for path in self.raw_files()? {
            match read_raw_file(&path) {
                RawFileOutcome::Loaded(file) => {
                    files_loaded += 1;
                    records.extend(file.records);
                }
                RawFileOutcome::Skipped { path, reason } => {
                    warn!("Skipping raw file {}: {}", path.display(), reason);
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }

        let (records, duplicates_replaced) = apply_policy(records, self.duplicate_policy);
        write_records(&self.master_path, &records)?;

        info!(
            "Rebuilt {} with {} rows from {} files ({} skipped)",
            self.master_path.display(),
            records.len(),
            files_loaded,
            skipped.len()
        );

        Ok(MasterSummary {
            path: self.master_path.clone(),
            rows: records.len(),
            files_loaded,
            duplicates_replaced,
            skipped,
        })
    }
}

/// Returns the surviving records and how many were replaced.
fn apply_policy(records: Vec<StringRecord>, policy: DuplicatePolicy) -> (Vec<StringRecord>, usize) {
    match policy {
        DuplicatePolicy::KeepAll => (records, 0),
        DuplicatePolicy::LatestWins => {
            let mut index: HashMap<(String, String), usize> = HashMap::new();
            let mut kept: Vec<StringRecord> = Vec::with_capacity(records.len());
            let mut replaced = 0;

            for record in records {
                let key = (
                    record.get(0).unwrap_or_default().to_string(),
                    record.get(1).unwrap_or_default().to_string(),
                );
                match index.get(&key) {
                    Some(&position) => {
                        kept[position] = record;
                        replaced += 1;
                    }
                    None => {
                        index.insert(key, kept.len());
                        kept.push(record);
                    }
                }
            }

            (kept, replaced)
        }
    }
}

fn write_records(path: &Path, records: &[StringRecord]) -> Result<()> {
    write_atomically(path, |w: &mut dyn Write| {
        let mut writer = WriterBuilder::new().from_writer(w);
        writer.write_record(OBSERVATION_COLUMNS)?;
        for record in records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    })
}
