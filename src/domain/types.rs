//! Shared types for beacon sightings and map output

use crate::domain::color::Color;
use crate::domain::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Format used for timestamps in labels (matches sqlite `datetime()`)
pub const LABEL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp of a sighting - either preformatted text or epoch seconds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Text(String),
    EpochSecs(i64),
}

impl Timestamp {
    /// Interpret the timestamp as a naive date time, if possible
    ///
    /// Text accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339 and a bare `YYYY-MM-DD`.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::EpochSecs(secs) => DateTime::from_timestamp(*secs, 0).map(|t| t.naive_utc()),
            Timestamp::Text(s) => {
                let s = s.trim();
                if let Ok(t) = NaiveDateTime::parse_from_str(s, LABEL_TIME_FORMAT) {
                    return Some(t);
                }
                if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                    return Some(t.naive_utc());
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        }
    }
}

/// Epoch seconds are rendered in UTC so labels do not depend on the host zone
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Text(s) => f.write_str(s),
            Timestamp::EpochSecs(secs) => match DateTime::from_timestamp(*secs, 0) {
                Some(t) => write!(f, "{}", t.format(LABEL_TIME_FORMAT)),
                None => write!(f, "{}", secs),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a date time string or epoch seconds")
            }

            fn visit_str<E>(self, value: &str) -> Result<Timestamp, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Timestamp, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::Text(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Timestamp, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::EpochSecs(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Timestamp, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Timestamp::EpochSecs)
                    .map_err(|_| E::custom(format!("epoch seconds out of range: {}", value)))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// Sighting as it appears on the wire, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct SightingRecord {
    pub timestamp: Timestamp,
    pub identifier: String,
    pub rssi: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    #[serde(default)]
    pub service_uuid: Option<String>,
}

/// A single recorded beacon sighting
///
/// Validated once on construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconSighting {
    timestamp: Timestamp,
    identifier: String,
    rssi: i32,
    latitude: f64,
    longitude: f64,
    accuracy: f64,
    service_uuid: Option<String>,
}

impl BeaconSighting {
    pub fn new(
        timestamp: Timestamp,
        identifier: impl Into<String>,
        rssi: i32,
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    ) -> CoreResult<Self> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(CoreError::invalid("identifier is empty"));
        }
        check_coordinate(latitude, longitude)?;
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(CoreError::invalid(format!(
                "accuracy must be a finite value >= 0, got {}",
                accuracy
            )));
        }

        Ok(Self { timestamp, identifier, rssi, latitude, longitude, accuracy, service_uuid: None })
    }

    pub fn with_service_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.service_uuid = Some(uuid.into());
        self
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn rssi(&self) -> i32 {
        self.rssi
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate { latitude: self.latitude, longitude: self.longitude }
    }

    /// Reported accuracy radius in meters
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn service_uuid(&self) -> Option<&str> {
        self.service_uuid.as_deref()
    }
}

impl TryFrom<SightingRecord> for BeaconSighting {
    type Error = CoreError;

    fn try_from(record: SightingRecord) -> CoreResult<Self> {
        let sighting = BeaconSighting::new(
            record.timestamp,
            record.identifier,
            record.rssi,
            record.latitude,
            record.longitude,
            record.accuracy,
        )?;
        Ok(match record.service_uuid {
            Some(uuid) => sighting.with_service_uuid(uuid),
            None => sighting,
        })
    }
}

/// Reject non-finite coordinates
pub(crate) fn check_coordinate(latitude: f64, longitude: f64) -> CoreResult<()> {
    if !latitude.is_finite() {
        return Err(CoreError::invalid(format!("latitude is not finite: {}", latitude)));
    }
    if !longitude.is_finite() {
        return Err(CoreError::invalid(format!("longitude is not finite: {}", longitude)));
    }
    Ok(())
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One point handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPoint {
    pub coordinate: Coordinate,
    pub color: Color,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::Text(s.to_string())
    }

    #[test]
    fn test_new_sighting() {
        let s = BeaconSighting::new(ts("2020-06-21 10:00:00"), "abc", -70, 52.5, 13.4, 12.0).unwrap();
        assert_eq!(s.identifier(), "abc");
        assert_eq!(s.rssi(), -70);
        assert_eq!(s.coordinate(), Coordinate::new(52.5, 13.4));
        assert_eq!(s.accuracy(), 12.0);
        assert_eq!(s.service_uuid(), None);
    }

    #[test]
    fn test_rejects_empty_identifier() {
        let err = BeaconSighting::new(ts("x"), "", -70, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        assert!(BeaconSighting::new(ts("x"), "a", 0, f64::NAN, 0.0, 0.0).is_err());
        assert!(BeaconSighting::new(ts("x"), "a", 0, 0.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_rejects_bad_accuracy() {
        assert!(BeaconSighting::new(ts("x"), "a", 0, 0.0, 0.0, -1.0).is_err());
        assert!(BeaconSighting::new(ts("x"), "a", 0, 0.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_record_deserialize_text_timestamp() {
        let json = r#"{"timestamp":"2020-06-21 20:00:00","identifier":"a1","rssi":-80,
            "latitude":1.0,"longitude":2.0,"accuracy":5.0,"service_uuid":"fd6f"}"#;
        let record: SightingRecord = serde_json::from_str(json).unwrap();
        let sighting = BeaconSighting::try_from(record).unwrap();
        assert_eq!(sighting.timestamp(), &ts("2020-06-21 20:00:00"));
        assert_eq!(sighting.service_uuid(), Some("fd6f"));
    }

    #[test]
    fn test_record_deserialize_epoch_timestamp() {
        let json = r#"{"timestamp":1592769600,"identifier":"a1","rssi":-80,
            "latitude":1.0,"longitude":2.0,"accuracy":5.0}"#;
        let record: SightingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp, Timestamp::EpochSecs(1592769600));
        assert_eq!(record.timestamp.to_string(), "2020-06-21 20:00:00");
    }

    #[test]
    fn test_timestamp_to_naive() {
        let expected = NaiveDate::from_ymd_opt(2020, 6, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(ts("2020-06-21").to_naive(), Some(expected));
        assert_eq!(ts("2020-06-21 00:00:00").to_naive(), Some(expected));
        assert_eq!(ts("2020-06-21T00:00:00Z").to_naive(), Some(expected));
        assert_eq!(Timestamp::EpochSecs(1592697600).to_naive(), Some(expected));
        assert_eq!(ts("yesterday").to_naive(), None);
    }
}
