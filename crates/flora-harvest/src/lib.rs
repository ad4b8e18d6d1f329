//! flora-harvest — build PlantCLEF-style training data from encyclopedia page images.

pub mod classify;
pub mod config;
pub mod fetch;
pub mod guard;
pub mod harvest;
pub mod index;
pub mod record;
pub mod resolver;
pub mod types;
pub mod writer;

pub use classify::{classify, image_extension, is_vector_image};
pub use config::{HarvestConfig, RecordDefaults};
pub use fetch::HttpFetcher;
pub use guard::HarvestManifest;
pub use harvest::Harvester;
pub use index::{build_index, render_index, write_index, ObservationIndex};
pub use record::MetadataRecord;
pub use resolver::PageImageResolver;
pub use types::*;
pub use writer::RecordWriter;
