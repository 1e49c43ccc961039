//! Data source abstraction
//!
//! - `DataSource` trait: the three async capabilities the core consumes
//! - `Catalog`: YAML description of the hierarchy and sector overrides
//! - `InMemoryDataSource`: catalog-backed implementation with call counters

pub mod catalog;
pub mod memory;
pub mod traits;

pub use catalog::Catalog;
pub use memory::{InMemoryDataSource, SourceStats};
pub use traits::DataSource;
