//! IO modules - file boundaries of the driver
//!
//! - `sightings` - JSONL sighting ingest and export-query filters
//! - `export` - display point output (JSONL format)

pub mod export;
pub mod sightings;

// Re-export commonly used types
pub use export::Export;
pub use sightings::{read_sightings, SightingFilter};
