//! Display point export - writes map points to file
//!
//! Points are written in JSONL format (one JSON object per line), in the
//! order the pipeline produced them. Colours are serialized as CSS
//! `rgba(r, g, b, a)` strings for the renderer.

use crate::domain::types::DisplayPoint;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Wire form of a display point
#[derive(Debug, Serialize)]
pub struct PointRecord<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub color: String,
    pub label: &'a str,
}

impl<'a> From<&'a DisplayPoint> for PointRecord<'a> {
    fn from(point: &'a DisplayPoint) -> Self {
        Self {
            latitude: point.coordinate.latitude,
            longitude: point.coordinate.longitude,
            color: point.color.to_rgba_string(),
            label: &point.label,
        }
    }
}

/// Export writer for display points
pub struct Export {
    file_path: String,
}

impl Export {
    pub fn new(file_path: &str) -> Self {
        debug!(file_path = %file_path, "export_initialized");
        Self { file_path: file_path.to_string() }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Write all points, replacing any previous export
    ///
    /// Returns the number of points written.
    pub fn write_points(&self, points: &[DisplayPoint]) -> anyhow::Result<usize> {
        let path = Path::new(&self.file_path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create export directory {}", parent.display())
                })?;
            }
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create export file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        write_jsonl(&mut writer, points)
            .with_context(|| format!("Failed to write export file {}", path.display()))?;
        writer.flush()?;

        info!(file = %self.file_path, points = %points.len(), "export_written");
        Ok(points.len())
    }
}

/// Serialize points as JSONL into any writer
pub fn write_jsonl<W: Write>(writer: &mut W, points: &[DisplayPoint]) -> anyhow::Result<()> {
    for point in points {
        serde_json::to_writer(&mut *writer, &PointRecord::from(point))?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
