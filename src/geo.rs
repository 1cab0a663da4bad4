// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Great-circle distance and the reporting-radius check.

use crate::config::GeofenceConfig;
use crate::error::{Rejection, Verdict};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point in degrees. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance between two points, in meters.
///
/// Inputs outside the valid latitude/longitude ranges give meaningless
/// results.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    // Rounding can push h just past 1 for near-antipodal points
    let h = ((d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Rejects issues pinned too far from the reporter.
#[derive(Debug, Clone)]
pub struct GeofenceValidator {
    config: GeofenceConfig,
}

impl GeofenceValidator {
    pub fn new(config: GeofenceConfig) -> Self {
        Self { config }
    }

    pub fn max_distance_m(&self) -> f64 {
        self.config.max_distance_m
    }

    /// Check that `issue` lies within the configured radius of `user`.
    pub fn validate(&self, issue: Coordinates, user: Coordinates) -> Verdict {
        let distance_m = distance_meters(issue, user);
        if distance_m > self.config.max_distance_m {
            debug!(
                distance_m,
                max_distance_m = self.config.max_distance_m,
                "Issue location out of range"
            );
            return Verdict::Rejected(Rejection::LocationOutOfRange {
                max_distance_m: self.config.max_distance_m,
                distance_m,
            });
        }
        Verdict::Accepted
    }
}
