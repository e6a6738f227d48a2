//! Minimal in-memory scene that applies change sets.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{BasicDrawable, ChangeRequest, ChangeSet, DrawableId, DrawableIdAllocator};

/// Errors reported while applying a change set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// A drawable was created under an id the scene already holds.
    #[error("{0} already exists")]
    DuplicateDrawable(DrawableId),

    /// A request referred to an id the scene does not hold.
    #[error("{0} does not exist")]
    UnknownDrawable(DrawableId),

    /// An elevation update carried more values than the drawable has vertices.
    #[error("{id} has {vertices} vertices, got {heights} heights")]
    VertexCountMismatch {
        id: DrawableId,
        vertices: usize,
        heights: usize,
    },

    /// An elevation update targeted a drawable built without elevation.
    #[error("{0} was not built with elevation")]
    NoElevation(DrawableId),
}

/// A drawable as held by the scene.
#[derive(Clone, Debug)]
pub struct SceneDrawable {
    pub drawable: BasicDrawable,
    pub enabled: bool,
}

/// Tracks the drawables a renderer would hold.
///
/// Owns the id allocator so every change set it hands out draws from the
/// same id space.
#[derive(Debug, Default)]
pub struct Scene {
    ids: Arc<DrawableIdAllocator>,
    drawables: FxHashMap<DrawableId, SceneDrawable>,
}

impl Scene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared id allocator for producers that build their own change sets.
    #[must_use]
    pub fn id_allocator(&self) -> Arc<DrawableIdAllocator> {
        self.ids.clone()
    }

    /// A new, empty change set bound to this scene's id space.
    #[must_use]
    pub fn change_set(&self) -> ChangeSet {
        ChangeSet::new(self.ids.clone())
    }

    /// Apply every request in order.
    ///
    /// Application is best-effort: a request that cannot be applied is
    /// skipped and logged, the rest still apply. The first failure is
    /// returned.
    pub fn apply(&mut self, changes: ChangeSet) -> Result<(), SceneError> {
        let mut first_error = None;
        for request in changes.into_requests() {
            if let Err(err) = self.apply_one(request) {
                log::warn!("Skipping change request: {err}");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn apply_one(&mut self, request: ChangeRequest) -> Result<(), SceneError> {
        match request {
            ChangeRequest::AddDrawable { id, drawable } => {
                if self.drawables.contains_key(&id) {
                    return Err(SceneError::DuplicateDrawable(id));
                }
                log::trace!(
                    "Adding {id} '{}' ({} vertices)",
                    drawable.name,
                    drawable.vertex_count()
                );
                let enabled = drawable.on;
                self.drawables.insert(
                    id,
                    SceneDrawable {
                        drawable: *drawable,
                        enabled,
                    },
                );
            }
            ChangeRequest::OnOff { id, enabled } => {
                self.get_mut(id)?.enabled = enabled;
            }
            ChangeRequest::RemoveDrawable { id } => {
                self.drawables
                    .remove(&id)
                    .ok_or(SceneError::UnknownDrawable(id))?;
            }
            ChangeRequest::SetElevation { id, heights } => {
                let entry = self.get_mut(id)?;
                if !entry.drawable.has_elevation {
                    return Err(SceneError::NoElevation(id));
                }
                let vertices = entry.drawable.vertex_count();
                if heights.len() > vertices {
                    return Err(SceneError::VertexCountMismatch {
                        id,
                        vertices,
                        heights: heights.len(),
                    });
                }
                for (vertex, height) in entry.drawable.vertices.iter_mut().zip(heights) {
                    vertex.elevation = height;
                }
            }
        }
        Ok(())
    }

    fn get_mut(&mut self, id: DrawableId) -> Result<&mut SceneDrawable, SceneError> {
        self.drawables
            .get_mut(&id)
            .ok_or(SceneError::UnknownDrawable(id))
    }

    /// Look up a drawable.
    #[must_use]
    pub fn get(&self, id: DrawableId) -> Option<&SceneDrawable> {
        self.drawables.get(&id)
    }

    /// True if the drawable exists and is enabled.
    #[must_use]
    pub fn is_enabled(&self, id: DrawableId) -> bool {
        self.drawables.get(&id).is_some_and(|d| d.enabled)
    }

    /// Number of drawables held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Number of enabled drawables.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.drawables.values().filter(|d| d.enabled).count()
    }

    /// Iterate over every drawable held.
    pub fn drawables(&self) -> impl Iterator<Item = (DrawableId, &SceneDrawable)> {
        self.drawables.iter().map(|(id, d)| (*id, d))
    }
}
