//! Local coordinate systems and conversion between them.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt::Debug;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::Mbr;

/// Largest latitude representable in spherical mercator, in radians (~85.0511°).
const MERCATOR_MAX_LAT: f64 = 1.484_422_229_745_332_4;

/// A coordinate system tiles can be laid out in.
///
/// Geographic coordinates are `(lon, lat, height)` with angles in radians.
pub trait CoordSystem: Debug + Send + Sync {
    /// Which family this system belongs to. Two systems of the same kind are
    /// interchangeable.
    fn kind(&self) -> CoordSystemKind;

    /// Convert a local point to geographic `(lon, lat, height)`.
    fn local_to_geographic(&self, local: DVec3) -> DVec3;

    /// Convert geographic `(lon, lat, height)` to a local point.
    fn geographic_to_local(&self, geo: DVec3) -> DVec3;
}

/// Convert a point from one local system to another through geographic space.
///
/// Systems of the same kind pass the point through untouched.
#[must_use]
pub fn convert_point(from: &dyn CoordSystem, to: &dyn CoordSystem, local: DVec3) -> DVec3 {
    if from.kind() == to.kind() {
        return local;
    }
    to.geographic_to_local(from.local_to_geographic(local))
}

/// Serializable selector for the built-in coordinate systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordSystemKind {
    /// Longitude/latitude used directly as x/y.
    #[default]
    PlateCarree,
    /// Web-style spherical mercator on the unit sphere.
    SphericalMercator,
}

impl CoordSystemKind {
    /// Construct the coordinate system this kind names.
    #[must_use]
    pub fn build(self) -> Arc<dyn CoordSystem> {
        match self {
            CoordSystemKind::PlateCarree => Arc::new(PlateCarree),
            CoordSystemKind::SphericalMercator => Arc::new(SphericalMercator),
        }
    }

    /// Local extent covering the whole globe.
    #[must_use]
    pub fn full_extent(self) -> Mbr {
        let max_y = match self {
            CoordSystemKind::PlateCarree => FRAC_PI_2,
            CoordSystemKind::SphericalMercator => SphericalMercator::MAX_Y,
        };
        Mbr::new(DVec2::new(-PI, -max_y), DVec2::new(PI, max_y))
    }
}

/// Plate carrée: local x/y are longitude/latitude in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlateCarree;

impl CoordSystem for PlateCarree {
    fn kind(&self) -> CoordSystemKind {
        CoordSystemKind::PlateCarree
    }

    fn local_to_geographic(&self, local: DVec3) -> DVec3 {
        local
    }

    fn geographic_to_local(&self, geo: DVec3) -> DVec3 {
        geo
    }
}

/// Spherical mercator on the unit sphere.
///
/// Latitudes beyond ±85.0511° are clamped, so the poles themselves are not
/// representable and must be covered by pole caps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SphericalMercator;

impl SphericalMercator {
    /// Local y extent covering the full clamped latitude range.
    pub const MAX_Y: f64 = PI;
}

impl CoordSystem for SphericalMercator {
    fn kind(&self) -> CoordSystemKind {
        CoordSystemKind::SphericalMercator
    }

    fn local_to_geographic(&self, local: DVec3) -> DVec3 {
        let lat = 2.0 * local.y.exp().atan() - FRAC_PI_2;
        DVec3::new(local.x, lat, local.z)
    }

    fn geographic_to_local(&self, geo: DVec3) -> DVec3 {
        let lat = geo.y.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
        let y = (FRAC_PI_4 + lat / 2.0).tan().ln();
        DVec3::new(geo.x, y, geo.z)
    }
}
