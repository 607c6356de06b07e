//! Beacon map library
//!
//! Colours and optionally jitters recorded beacon sightings for a map
//! renderer. Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
