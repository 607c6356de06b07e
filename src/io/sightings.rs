//! Sighting ingest - reads recorded sightings from JSONL
//!
//! One JSON object per line. The filters here reproduce the export query of
//! the recording app: exposure notification service UUID, a date cutoff, and
//! ordering by identifier so that runs line up with beacons.

use crate::domain::types::{BeaconSighting, SightingRecord};
use crate::infra::config::Config;
use anyhow::Context;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Parse sightings from any line-oriented reader
///
/// Blank lines are skipped. The first malformed or invalid line aborts with
/// its 1-based line number.
pub fn parse_sightings<R: BufRead>(reader: R) -> anyhow::Result<Vec<BeaconSighting>> {
    let mut sightings = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: SightingRecord = serde_json::from_str(&line)
            .with_context(|| format!("Malformed sighting on line {}", line_no))?;
        let sighting = BeaconSighting::try_from(record)
            .with_context(|| format!("Invalid sighting on line {}", line_no))?;
        sightings.push(sighting);
    }

    Ok(sightings)
}

/// Read all sightings from a JSONL file
pub fn read_sightings<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<BeaconSighting>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open sightings file {}", path.display()))?;

    let sightings = parse_sightings(BufReader::new(file))
        .with_context(|| format!("Failed to load sightings from {}", path.display()))?;

    info!(file = %path.display(), sightings = %sightings.len(), "sightings_loaded");
    Ok(sightings)
}

/// Selection and ordering applied before the pipeline runs
#[derive(Debug, Clone)]
pub struct SightingFilter {
    service_uuid: String,
    require_service_uuid: bool,
    not_before: Option<NaiveDateTime>,
    order_by_identifier: bool,
}

impl SightingFilter {
    pub fn new(service_uuid: &str) -> Self {
        Self {
            service_uuid: service_uuid.to_string(),
            require_service_uuid: false,
            not_before: None,
            order_by_identifier: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            service_uuid: config.service_uuid().to_string(),
            require_service_uuid: config.require_service_uuid(),
            not_before: config.not_before(),
            order_by_identifier: config.order_by_identifier(),
        }
    }

    pub fn require_service_uuid(mut self, required: bool) -> Self {
        self.require_service_uuid = required;
        self
    }

    pub fn not_before(mut self, cutoff: NaiveDateTime) -> Self {
        self.not_before = Some(cutoff);
        self
    }

    pub fn order_by_identifier(mut self, enabled: bool) -> Self {
        self.order_by_identifier = enabled;
        self
    }

    /// Whether a single sighting passes the selection
    pub fn matches(&self, sighting: &BeaconSighting) -> bool {
        let uuid_ok = match sighting.service_uuid() {
            Some(uuid) => uuid.eq_ignore_ascii_case(&self.service_uuid),
            None => !self.require_service_uuid,
        };
        if !uuid_ok {
            return false;
        }

        match self.not_before {
            // Unparseable timestamps cannot be compared and are dropped
            Some(cutoff) => sighting.timestamp().to_naive().is_some_and(|t| t > cutoff),
            None => true,
        }
    }

    /// Select and order sightings
    pub fn apply(&self, sightings: Vec<BeaconSighting>) -> Vec<BeaconSighting> {
        let total = sightings.len();
        let mut kept: Vec<BeaconSighting> =
            sightings.into_iter().filter(|s| self.matches(s)).collect();

        if self.order_by_identifier {
            kept.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        }

        debug!(
            total = %total,
            kept = %kept.len(),
            dropped = %(total - kept.len()),
            ordered = %self.order_by_identifier,
            "sightings_filtered"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const SAMPLE: &str = r#"{"timestamp":"2020-06-21 10:00:00","identifier":"bb","rssi":-80,"latitude":52.0,"longitude":13.0,"accuracy":10.0,"service_uuid":"fd6f"}

{"timestamp":"2020-06-20 09:00:00","identifier":"aa","rssi":-70,"latitude":52.1,"longitude":13.1,"accuracy":0.0,"service_uuid":"fd6f"}
{"timestamp":1592769600,"identifier":"aa","rssi":-60,"latitude":52.2,"longitude":13.2,"accuracy":4.5,"service_uuid":"FD6F"}
{"timestamp":"2020-06-22 08:00:00","identifier":"cc","rssi":-90,"latitude":52.3,"longitude":13.3,"accuracy":3.0,"service_uuid":"feaa"}
{"timestamp":"2020-06-22 09:00:00","identifier":"dd","rssi":-91,"latitude":52.4,"longitude":13.4,"accuracy":3.0}
"#;

    fn sample() -> Vec<BeaconSighting> {
        parse_sightings(Cursor::new(SAMPLE)).unwrap()
    }

    fn cutoff() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 21).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let sightings = sample();
        assert_eq!(sightings.len(), 5);
        assert_eq!(sightings[0].identifier(), "bb");
        assert_eq!(sightings[4].service_uuid(), None);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let input = "{\"timestamp\":\"x\",\"identifier\":\"a\",\"rssi\":1,\"latitude\":0,\"longitude\":0,\"accuracy\":0}\nnot json\n";
        let err = parse_sightings(Cursor::new(input)).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_negative_accuracy() {
        let input = "{\"timestamp\":\"x\",\"identifier\":\"a\",\"rssi\":1,\"latitude\":0,\"longitude\":0,\"accuracy\":-2}\n";
        let err = parse_sightings(Cursor::new(input)).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 1"));
        assert!(msg.contains("accuracy"));
    }

    #[test]
    fn test_service_uuid_filter() {
        let kept = SightingFilter::new("fd6f").order_by_identifier(false).apply(sample());
        let ids: Vec<&str> = kept.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, vec!["bb", "aa", "aa", "dd"]);

        let kept = SightingFilter::new("fd6f")
            .require_service_uuid(true)
            .order_by_identifier(false)
            .apply(sample());
        let ids: Vec<&str> = kept.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, vec!["bb", "aa", "aa"]);
    }

    #[test]
    fn test_not_before_filter() {
        let kept = SightingFilter::new("fd6f")
            .not_before(cutoff())
            .order_by_identifier(false)
            .apply(sample());
        let ids: Vec<&str> = kept.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, vec!["bb", "aa", "dd"]);
    }

    #[test]
    fn test_order_by_identifier_is_stable() {
        let kept = SightingFilter::new("fd6f").apply(sample());
        let ids: Vec<&str> = kept.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, vec!["aa", "aa", "bb", "dd"]);
        assert_eq!(kept[0].rssi(), -70);
        assert_eq!(kept[1].rssi(), -60);
    }

    #[test]
    fn test_from_config() {
        let config = Config::default().with_not_before(cutoff());
        let kept = SightingFilter::from_config(&config).apply(sample());
        assert_eq!(kept.len(), 3);
    }
}
