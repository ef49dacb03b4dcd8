//! Dimensional mart pipeline
//!
//! Turns raw e-commerce source relations into a star schema: one
//! order-line fact table plus customer, product, and seller dimensions.
//! Every run is a full refresh — a pure function of the current source
//! snapshot — and the four marts are published together or not at all.

pub mod marts;
pub mod pipeline;
pub mod publish;
pub mod source;
pub mod staging;

pub use pipeline::{MartSnapshot, Pipeline};
pub use publish::ParquetPublisher;
pub use source::{CsvCatalog, MemoryCatalog, SourceCatalog};
pub use staging::{StagedSources, StagedTable, StagingOutcome};
