//! Domain models - sightings, colours and display points
//!
//! - `BeaconSighting` - a validated, immutable beacon observation
//! - `Color` - marker colour derived from a hue
//! - `DisplayPoint` - coordinate, colour and label handed to the renderer
//! - `CoreError` - input validation failures

pub mod color;
pub mod error;
pub mod types;

// Re-export commonly used types at module level
pub use color::{hue_to_rgb, Color};
pub use error::{CoreError, CoreResult};
pub use types::{BeaconSighting, Coordinate, DisplayPoint, SightingRecord, Timestamp};
