//! Geodesic jitter for reported positions
//!
//! Moves a coordinate a random distance (bounded by the reported accuracy
//! radius) in a random bearing along a sphere, so a plotted point lands
//! somewhere inside the uncertainty circle instead of on the exact fix.

use crate::domain::error::{CoreError, CoreResult};
use crate::domain::types::{check_coordinate, Coordinate};
use rand::Rng;
use tracing::debug;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Wrap a longitude into [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Destination reached from `origin` after `distance_m` along `bearing_deg`
///
/// Spherical direct formula. Longitude is not wrapped.
///
/// Starting at a pole, distances below roughly 0.1 m round `cos δ` to 1.0,
/// so the latitude stays at exactly ±90. The error is bounded by the
/// distance itself.
pub fn destination(origin: Coordinate, distance_m: f64, bearing_deg: f64) -> Coordinate {
    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    // Rounding can push the argument past 1 at the poles
    let sin_phi2 = (sin_phi1 * cos_delta + cos_phi1 * sin_delta * theta.cos()).clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let lambda2 =
        lambda1 + (theta.sin() * sin_delta * cos_phi1).atan2(cos_delta - sin_phi1 * sin_phi2);

    Coordinate { latitude: phi2.to_degrees(), longitude: lambda2.to_degrees() }
}

/// Great-circle distance in meters (haversine)
pub fn great_circle_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Random displacement within a radius
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicJitter {
    normalize_longitude: bool,
}

impl GeodesicJitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap displaced longitudes into [-180, 180)
    pub fn with_normalized_longitude(mut self, enabled: bool) -> Self {
        self.normalize_longitude = enabled;
        self
    }

    pub fn normalizes_longitude(&self) -> bool {
        self.normalize_longitude
    }

    /// Displace `(lat, lon)` by up to `max_distance_m` meters
    ///
    /// A zero radius returns the input unchanged without drawing from `rng`.
    pub fn displace<R: Rng + ?Sized>(
        &self,
        lat: f64,
        lon: f64,
        max_distance_m: f64,
        rng: &mut R,
    ) -> CoreResult<Coordinate> {
        check_coordinate(lat, lon)?;
        if !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Err(CoreError::invalid(format!(
                "max distance must be a finite value >= 0, got {}",
                max_distance_m
            )));
        }

        let origin = Coordinate::new(lat, lon);
        if max_distance_m == 0.0 {
            return Ok(origin);
        }

        let distance = rng.gen_range(0.0..=max_distance_m);
        let bearing = rng.gen_range(0.0..360.0);
        let mut moved = destination(origin, distance, bearing);
        if self.normalize_longitude {
            moved.longitude = normalize_longitude(moved.longitude);
        }

        debug!(
            distance_m = %distance,
            bearing_deg = %bearing,
            lat = %moved.latitude,
            lon = %moved.longitude,
            "position_jittered"
        );

        Ok(moved)
    }
}
