mod extraction_worker;

pub use extraction_worker::{spawn_extraction_workers, ExtractionJob, OutcomeSink};
