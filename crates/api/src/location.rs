// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort location capture for submissions.
//!
//! A missing location fix never blocks or fails a submission. Every failure
//! mode here degrades to "no location" with a warning.

use std::future::Future;
use std::time::Duration;

use attendance_domain::{GeoPoint, Location, validate_geo_point};
use tracing::{debug, warn};

/// Default bound on location acquisition and address resolution.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Why a location could not be captured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The device did not report a fix.
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    /// The vendor declined location access.
    #[error("Location permission denied")]
    PermissionDenied,
    /// Acquisition did not finish in time.
    #[error("Location acquisition timed out after {0:?}")]
    TimedOut(Duration),
}

/// Acquires the vendor's current coordinates.
pub trait LocationProvider {
    /// Acquires one coordinate fix.
    fn acquire(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send;
}

/// Turns coordinates into a human-readable address.
pub trait AddressResolver {
    /// Resolves an address for a fix. `Ok(None)` means no address is known.
    fn resolve(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<Option<String>, LocationError>> + Send;
}

/// The fix the vendor's device attached to the request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportedLocation {
    fix: Option<GeoPoint>,
}

impl ReportedLocation {
    /// Wraps the coordinates reported by the device.
    #[must_use]
    pub const fn new(fix: Option<GeoPoint>) -> Self {
        Self { fix }
    }

    /// Builds a report from optional latitude and longitude fields.
    ///
    /// Both fields are needed for a fix; a lone coordinate is ignored.
    #[must_use]
    pub const fn from_fields(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                Self::new(Some(GeoPoint::new(latitude, longitude)))
            }
            _ => Self::new(None),
        }
    }
}

impl LocationProvider for ReportedLocation {
    fn acquire(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send {
        let fix: Option<GeoPoint> = self.fix;
        async move {
            fix.ok_or_else(|| {
                LocationError::Unavailable(String::from("the device did not report a fix"))
            })
        }
    }
}

/// An address resolver that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAddressResolver;

impl AddressResolver for NoAddressResolver {
    fn resolve(
        &self,
        _point: GeoPoint,
    ) -> impl Future<Output = Result<Option<String>, LocationError>> + Send {
        async { Ok(None) }
    }
}

/// Captures the vendor's location for a submission.
///
/// Acquisition and address resolution are each bounded by `timeout`.
///
/// # Returns
///
/// * `Some(Location)` with coordinates, and an address when one resolved
/// * `None` if no valid fix was acquired in time
pub async fn capture_location<P, R>(
    provider: &P,
    resolver: &R,
    timeout: Duration,
) -> Option<Location>
where
    P: LocationProvider + Sync,
    R: AddressResolver + Sync,
{
    let point: GeoPoint = match tokio::time::timeout(timeout, provider.acquire()).await {
        Ok(Ok(point)) => point,
        Ok(Err(err)) => {
            warn!(error = %err, "Recording submission without a location");
            return None;
        }
        Err(_) => {
            let err: LocationError = LocationError::TimedOut(timeout);
            warn!(error = %err, "Recording submission without a location");
            return None;
        }
    };

    if let Err(err) = validate_geo_point(&point) {
        warn!(error = %err, "Discarding invalid location fix");
        return None;
    }

    let location: Location = Location::from_point(point);
    match tokio::time::timeout(timeout, resolver.resolve(point)).await {
        Ok(Ok(Some(address))) => Some(location.with_address(address)),
        Ok(Ok(None)) => Some(location),
        Ok(Err(err)) => {
            debug!(error = %err, "Address resolution failed; keeping coordinates");
            Some(location)
        }
        Err(_) => {
            debug!("Address resolution timed out; keeping coordinates");
            Some(location)
        }
    }
}
