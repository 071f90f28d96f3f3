pub mod districts_reader;
pub mod raw_reader;

pub use districts_reader::read_geocoded_districts;
pub use raw_reader::{read_raw_file, RawFile, RawFileOutcome};
