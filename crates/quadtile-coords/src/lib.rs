//! Coordinate systems, display adapters and geographic bounding boxes.
//!
//! Tiles are described in a *local* coordinate system (plate carrée radians,
//! spherical mercator, ...). A [`CoordSystemDisplayAdapter`] maps the local
//! coordinates of its own system into display space, which is either a unit
//! globe or a flat plane. Points move between local systems through
//! geographic coordinates with [`convert_point`].

mod coord_system;
mod display;
mod mbr;

pub use coord_system::{CoordSystem, CoordSystemKind, PlateCarree, SphericalMercator, convert_point};
pub use display::{
    CoordSystemDisplayAdapter, DisplayKind, FlatDisplayAdapter, GeocentricDisplayAdapter,
};
pub use mbr::Mbr;
