pub mod classifier;
pub mod enricher;
pub mod extractor;
pub mod pod_name;

pub use enricher::enrich;
