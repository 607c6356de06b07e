//! Sightings to display points
//!
//! One forward pass: optionally jitter each position inside its accuracy
//! radius, colour it by identifier run, and attach a label. Nothing is
//! dropped or reordered.

use crate::domain::error::CoreResult;
use crate::domain::types::{BeaconSighting, DisplayPoint};
use crate::infra::config::Config;
use crate::services::jitter::GeodesicJitter;
use crate::services::run_colors::{GroupingMode, RunColorAssigner};
use rand::Rng;
use tracing::info;

/// Separator between timestamp and identifier in labels
pub const DEFAULT_LABEL_SEPARATOR: &str = "<br>";

/// Composes jitter and run colouring over an ordered sighting list
#[derive(Debug, Clone)]
pub struct MapPipeline {
    jitter: Option<GeodesicJitter>,
    grouping: GroupingMode,
    alpha: Option<f64>,
    label_separator: String,
}

impl Default for MapPipeline {
    fn default() -> Self {
        Self {
            jitter: None,
            grouping: GroupingMode::Adjacency,
            alpha: None,
            label_separator: DEFAULT_LABEL_SEPARATOR.to_string(),
        }
    }
}

impl MapPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let jitter = config.jitter_enabled().then(|| {
            GeodesicJitter::new().with_normalized_longitude(config.normalize_longitude())
        });
        Self {
            jitter,
            grouping: config.grouping_mode(),
            alpha: Some(config.color_alpha()),
            label_separator: config.label_separator().to_string(),
        }
    }

    pub fn with_jitter(mut self, jitter: GeodesicJitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingMode) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_label_separator(mut self, separator: &str) -> Self {
        self.label_separator = separator.to_string();
        self
    }

    pub fn jitter_enabled(&self) -> bool {
        self.jitter.is_some()
    }

    /// Label shown in the renderer's info box
    pub fn label(&self, sighting: &BeaconSighting) -> String {
        format!("{}{}{}", sighting.timestamp(), self.label_separator, sighting.identifier())
    }

    /// Turn ordered sightings into display points
    ///
    /// Errors name the index of the sighting that failed validation.
    pub fn run<R: Rng + ?Sized>(
        &self,
        sightings: &[BeaconSighting],
        rng: &mut R,
    ) -> CoreResult<Vec<DisplayPoint>> {
        let mut colors = RunColorAssigner::new(self.grouping);
        if let Some(alpha) = self.alpha {
            colors = colors.with_alpha(alpha);
        }

        let mut points = Vec::with_capacity(sightings.len());
        for (i, sighting) in sightings.iter().enumerate() {
            let coordinate = match &self.jitter {
                Some(jitter) => jitter
                    .displace(sighting.latitude(), sighting.longitude(), sighting.accuracy(), rng)
                    .map_err(|e| e.at(i))?,
                None => sighting.coordinate(),
            };
            let color = colors.next_color(sighting.identifier(), rng).map_err(|e| e.at(i))?;

            points.push(DisplayPoint { coordinate, color, label: self.label(sighting) });
        }

        info!(
            points = %points.len(),
            runs = %colors.runs(),
            grouping = %self.grouping.as_str(),
            jitter = %self.jitter_enabled(),
            "pipeline_complete"
        );

        Ok(points)
    }
}
