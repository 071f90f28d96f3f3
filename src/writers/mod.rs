pub mod dataset_writer;
pub mod districts_writer;

pub use dataset_writer::{DatasetWriter, DuplicatePolicy, MasterSummary, SkippedFile};
pub use districts_writer::write_geocoded_districts;
