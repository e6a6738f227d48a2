//! Ordered command list consumed by a scene.

use std::sync::Arc;

use crate::{BasicDrawable, DrawableId, DrawableIdAllocator};

/// One command for the scene. Each carries the id it applies to, so a scene
/// can apply it with no further lookup on the producer's side.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeRequest {
    /// Create a drawable under `id`.
    AddDrawable {
        id: DrawableId,
        drawable: Box<BasicDrawable>,
    },
    /// Show or hide a drawable.
    OnOff { id: DrawableId, enabled: bool },
    /// Release a drawable.
    RemoveDrawable { id: DrawableId },
    /// Overwrite the elevation of the first `heights.len()` vertices.
    SetElevation { id: DrawableId, heights: Vec<f32> },
}

impl ChangeRequest {
    /// The drawable this request targets.
    #[must_use]
    pub fn id(&self) -> DrawableId {
        match self {
            ChangeRequest::AddDrawable { id, .. }
            | ChangeRequest::OnOff { id, .. }
            | ChangeRequest::RemoveDrawable { id }
            | ChangeRequest::SetElevation { id, .. } => *id,
        }
    }
}

/// Accumulates [`ChangeRequest`]s over one update cycle.
///
/// Order is preserved: creates come before the enables that refer to them,
/// removes come after. Ids are drawn from the allocator of the scene the
/// change set will be applied to.
#[derive(Debug)]
pub struct ChangeSet {
    ids: Arc<DrawableIdAllocator>,
    requests: Vec<ChangeRequest>,
}

impl ChangeSet {
    /// An empty change set drawing ids from `ids`.
    #[must_use]
    pub fn new(ids: Arc<DrawableIdAllocator>) -> Self {
        Self {
            ids,
            requests: Vec::new(),
        }
    }

    /// Queue creation of `drawable` and return the id it will live under.
    pub fn add_drawable(&mut self, drawable: BasicDrawable) -> DrawableId {
        let id = self.ids.allocate();
        self.requests.push(ChangeRequest::AddDrawable {
            id,
            drawable: Box::new(drawable),
        });
        id
    }

    /// Queue a visibility change.
    pub fn set_enabled(&mut self, id: DrawableId, enabled: bool) {
        self.requests.push(ChangeRequest::OnOff { id, enabled });
    }

    /// Queue release of a drawable.
    pub fn remove_drawable(&mut self, id: DrawableId) {
        self.requests.push(ChangeRequest::RemoveDrawable { id });
    }

    /// Queue an elevation update.
    pub fn set_elevation(&mut self, id: DrawableId, heights: Vec<f32>) {
        self.requests.push(ChangeRequest::SetElevation { id, heights });
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Queued requests in order.
    #[must_use]
    pub fn requests(&self) -> &[ChangeRequest] {
        &self.requests
    }

    /// Consume the change set, yielding its requests in order.
    #[must_use]
    pub fn into_requests(self) -> Vec<ChangeRequest> {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Primitive;

    #[test]
    fn test_order_is_preserved() {
        let mut changes = ChangeSet::new(Arc::new(DrawableIdAllocator::new()));
        let id = changes.add_drawable(BasicDrawable::new("a", Primitive::Triangles));
        changes.set_enabled(id, true);
        changes.remove_drawable(id);

        let ids: Vec<_> = changes.requests().iter().map(ChangeRequest::id).collect();
        assert_eq!(ids, vec![id, id, id]);
        assert!(matches!(changes.requests()[0], ChangeRequest::AddDrawable { .. }));
        assert!(matches!(
            changes.requests()[1],
            ChangeRequest::OnOff { enabled: true, .. }
        ));
        assert!(matches!(changes.requests()[2], ChangeRequest::RemoveDrawable { .. }));
    }

    #[test]
    fn test_change_sets_share_an_allocator() {
        let ids = Arc::new(DrawableIdAllocator::new());
        let mut first = ChangeSet::new(ids.clone());
        let mut second = ChangeSet::new(ids);
        let a = first.add_drawable(BasicDrawable::new("a", Primitive::Triangles));
        let b = second.add_drawable(BasicDrawable::new("b", Primitive::Triangles));
        assert_ne!(a, b);
    }
}
