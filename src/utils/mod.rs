pub mod atomic;
pub mod constants;
pub mod coordinates;
pub mod dates;
pub mod filename;
pub mod progress;

pub use atomic::write_atomically;
pub use constants::*;
pub use coordinates::{parse_coordinate, round_coordinate};
pub use dates::resolve_target_date;
pub use filename::{is_csv_file, raw_file_path};
pub use progress::ProgressReporter;
