//! Display adapters: map local coordinates into render space.

use std::fmt::Debug;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::{CoordSystem, PlateCarree};

/// Maps points in one coordinate system into display (render) space.
pub trait CoordSystemDisplayAdapter: Debug + Send + Sync {
    /// The coordinate system local points are expressed in.
    fn coord_system(&self) -> &dyn CoordSystem;

    /// Local point to display space.
    fn local_to_display(&self, local: DVec3) -> DVec3;

    /// Display point back to the local system.
    fn display_to_local(&self, display: DVec3) -> DVec3;

    /// Outward surface normal in display space at a local point.
    fn normal_for_local(&self, local: DVec3) -> DVec3;

    /// True if display space is a plane rather than a globe.
    fn is_flat(&self) -> bool;
}

/// Serializable selector for the built-in display adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayKind {
    /// Unit-radius globe.
    #[default]
    Globe,
    /// Flat map in the tile coordinate system's units.
    Flat,
}

/// Globe display: plate carrée radians onto the unit sphere.
///
/// `+z` points to the north pole, `+x` to `(lon 0, lat 0)`. Height is
/// expressed in planet radii.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeocentricDisplayAdapter {
    coord_system: PlateCarree,
}

impl GeocentricDisplayAdapter {
    /// A globe adapter with unit radius.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoordSystemDisplayAdapter for GeocentricDisplayAdapter {
    fn coord_system(&self) -> &dyn CoordSystem {
        &self.coord_system
    }

    fn local_to_display(&self, local: DVec3) -> DVec3 {
        let (sin_lon, cos_lon) = local.x.sin_cos();
        let (sin_lat, cos_lat) = local.y.sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat) * (1.0 + local.z)
    }

    fn display_to_local(&self, display: DVec3) -> DVec3 {
        let radius = display.length();
        if radius == 0.0 {
            return DVec3::new(0.0, 0.0, -1.0);
        }
        let lon = display.y.atan2(display.x);
        let lat = (display.z / radius).clamp(-1.0, 1.0).asin();
        DVec3::new(lon, lat, radius - 1.0)
    }

    fn normal_for_local(&self, local: DVec3) -> DVec3 {
        self.local_to_display(DVec3::new(local.x, local.y, 0.0))
    }

    fn is_flat(&self) -> bool {
        false
    }
}

/// Flat display: local coordinates shifted to `center` and scaled.
#[derive(Clone, Debug)]
pub struct FlatDisplayAdapter {
    coord_system: Arc<dyn CoordSystem>,
    center: DVec2,
    scale: f64,
}

impl FlatDisplayAdapter {
    /// A flat adapter centered on `center`, multiplying local units by `scale`.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not a positive finite number.
    #[must_use]
    pub fn new(coord_system: Arc<dyn CoordSystem>, center: DVec2, scale: f64) -> Self {
        assert!(
            scale.is_finite() && scale > 0.0,
            "display scale must be positive, got {scale}"
        );
        Self {
            coord_system,
            center,
            scale,
        }
    }
}

impl CoordSystemDisplayAdapter for FlatDisplayAdapter {
    fn coord_system(&self) -> &dyn CoordSystem {
        self.coord_system.as_ref()
    }

    fn local_to_display(&self, local: DVec3) -> DVec3 {
        DVec3::new(
            (local.x - self.center.x) * self.scale,
            (local.y - self.center.y) * self.scale,
            local.z * self.scale,
        )
    }

    fn display_to_local(&self, display: DVec3) -> DVec3 {
        DVec3::new(
            display.x / self.scale + self.center.x,
            display.y / self.scale + self.center.y,
            display.z / self.scale,
        )
    }

    fn normal_for_local(&self, _local: DVec3) -> DVec3 {
        DVec3::Z
    }

    fn is_flat(&self) -> bool {
        true
    }
}
