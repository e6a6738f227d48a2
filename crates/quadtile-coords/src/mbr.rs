//! Axis-aligned 2D bounding rectangle in a local coordinate system.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Minimum bounding rectangle, lower-left / upper-right.
///
/// Invariant: `ll.x <= ur.x` and `ll.y <= ur.y`. [`Mbr::new`] sorts the
/// components so the invariant holds for any two corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mbr {
    /// Lower-left corner.
    pub ll: DVec2,
    /// Upper-right corner.
    pub ur: DVec2,
}

impl Mbr {
    /// Create a rectangle from two opposite corners.
    #[must_use]
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            ll: a.min(b),
            ur: a.max(b),
        }
    }

    /// Width along x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.ur.x - self.ll.x
    }

    /// Height along y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.ur.y - self.ll.y
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn span(&self) -> DVec2 {
        self.ur - self.ll
    }

    /// Center point.
    #[must_use]
    pub fn mid(&self) -> DVec2 {
        (self.ll + self.ur) * 0.5
    }

    /// True when the rectangle has zero (or NaN) area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// True if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.ll.x && p.x <= self.ur.x && p.y >= self.ll.y && p.y <= self.ur.y
    }

    /// True if the two rectangles share a region of positive area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Mbr) -> bool {
        self.intersection(other).is_some()
    }

    /// The shared region of two rectangles, or `None` if it has no area.
    #[must_use]
    pub fn intersection(&self, other: &Mbr) -> Option<Mbr> {
        let clipped = Mbr {
            ll: self.ll.max(other.ll),
            ur: self.ur.min(other.ur),
        };
        (!clipped.is_degenerate()).then_some(clipped)
    }

    /// Grow the rectangle so it contains `p`.
    pub fn add_point(&mut self, p: DVec2) {
        self.ll = self.ll.min(p);
        self.ur = self.ur.max(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_corners() {
        let mbr = Mbr::new(DVec2::new(2.0, -1.0), DVec2::new(-2.0, 1.0));
        assert_eq!(mbr.ll, DVec2::new(-2.0, -1.0));
        assert_eq!(mbr.ur, DVec2::new(2.0, 1.0));
        assert_eq!(mbr.mid(), DVec2::ZERO);
    }

    #[test]
    fn test_edge_touching_is_not_overlap() {
        let a = Mbr::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        let b = Mbr::new(DVec2::new(1.0, 0.0), DVec2::new(2.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_intersection_clips_to_shared_region() {
        let a = Mbr::new(DVec2::new(0.0, 0.0), DVec2::new(4.0, 4.0));
        let b = Mbr::new(DVec2::new(2.0, -1.0), DVec2::new(6.0, 3.0));
        let clipped = a.intersection(&b).expect("rectangles overlap");
        assert_eq!(clipped.ll, DVec2::new(2.0, 0.0));
        assert_eq!(clipped.ur, DVec2::new(4.0, 3.0));
    }

    #[test]
    fn test_zero_area_is_degenerate() {
        let line = Mbr::new(DVec2::new(0.0, 0.0), DVec2::new(0.0, 5.0));
        assert!(line.is_degenerate());
        let nan = Mbr {
            ll: DVec2::new(f64::NAN, 0.0),
            ur: DVec2::new(1.0, 1.0),
        };
        assert!(nan.is_degenerate());
    }

    #[test]
    fn test_add_point_grows() {
        let mut mbr = Mbr::new(DVec2::ZERO, DVec2::ONE);
        mbr.add_point(DVec2::new(-1.0, 3.0));
        assert!(mbr.contains(DVec2::new(-0.5, 2.5)));
        assert_eq!(mbr.height(), 3.0);
    }
}
