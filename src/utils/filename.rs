use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Raw daily file name: `YYYY-MM-DD.csv`
pub fn raw_file_name(date: NaiveDate) -> String {
    format!("{}.csv", date.format("%Y-%m-%d"))
}

pub fn raw_file_path(raw_dir: &Path, date: NaiveDate) -> PathBuf {
    raw_dir.join(raw_file_name(date))
}

/// True for regular `.csv` files, extension compared case-insensitively
pub fn is_csv_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
}
