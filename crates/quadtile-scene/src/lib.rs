//! Render-side vocabulary: drawable descriptors, resource identifiers and the
//! ordered change list that carries them to a scene.
//!
//! Producers never touch GPU resources directly. They describe drawables,
//! append commands to a [`ChangeSet`] and hand it to whoever owns the
//! renderer. [`Scene`] is a minimal in-memory consumer that tracks what a
//! renderer would hold after applying the commands.

mod change_set;
mod color;
mod drawable;
mod ids;
mod scene;

pub use change_set::{ChangeRequest, ChangeSet};
pub use color::RgbaColor;
pub use drawable::{BasicDrawable, Primitive, TileVertex};
pub use ids::{DrawableId, DrawableIdAllocator, ProgramId};
pub use scene::{Scene, SceneDrawable, SceneError};
