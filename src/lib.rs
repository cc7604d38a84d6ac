// BDX Delta - Core Library
// Feed ingestion, dated extract registry and snapshot comparison

pub mod error;
pub mod config;
pub mod resolver;
pub mod parser;
pub mod entities;
pub mod snapshot;
pub mod ingest;
pub mod registry;
pub mod matcher;
pub mod pricing;
pub mod report;
pub mod export;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{FeedError, Result};
pub use config::{ClientConfig, IngestOptions, DEFAULT_GEOTAG};
pub use resolver::{
    filter_name, lookup_slug, node_slug, slugify,
    Catalogue, CatalogueEntry, ExternalId, ResolutionPolicy,
};
pub use entities::{
    Builder, Subdivision, Plan, Company, Entity, EntityKind, Node,
    ImageKind, ImageRecord, GroupedCounts, SalesOffice, SchoolDistrict,
};
pub use snapshot::Snapshot;
pub use ingest::{ingest, ingest_file, ingest_pair};
pub use registry::{FileRecord, Generation, SnapshotRegistry};
pub use matcher::{match_by_external_id, match_plan};
pub use pricing::delta;
pub use report::{ChangeEntry, ChangeReport};
pub use export::{export_snapshot, php_serialize, write_csv, Flatten};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
