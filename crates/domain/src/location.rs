// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new `GeoPoint`. Range checks live in `validate_geo_point`.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Where a vendor was when a submission was captured.
///
/// Both parts are optional: a fix can exist without a resolved address, and
/// reverse geocoding is a non-essential enrichment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// The device-reported coordinates.
    pub coordinates: Option<GeoPoint>,
    /// A human-readable address resolved from the coordinates.
    pub address: Option<String>,
}

impl Location {
    /// Creates a location from a coordinate fix with no address.
    #[must_use]
    pub const fn from_point(point: GeoPoint) -> Self {
        Self {
            coordinates: Some(point),
            address: None,
        }
    }

    /// Returns this location with the given address attached.
    #[must_use]
    pub fn with_address(mut self, address: String) -> Self {
        self.address = Some(address);
        self
    }

    /// Returns true if neither coordinates nor address are present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.coordinates.is_none() && self.address.is_none()
    }
}
