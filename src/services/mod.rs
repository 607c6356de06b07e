//! Services - the colouring and jitter core
//!
//! - `run_colors` - colour per identifier run
//! - `jitter` - random geodesic displacement inside an accuracy radius
//! - `pipeline` - composes both into display points

pub mod jitter;
pub mod pipeline;
pub mod run_colors;

// Re-export commonly used types
pub use jitter::{great_circle_distance_m, GeodesicJitter, EARTH_RADIUS_M};
pub use pipeline::MapPipeline;
pub use run_colors::{GroupingMode, RunColorAssigner};
