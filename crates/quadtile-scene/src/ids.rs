//! Opaque resource identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Handle naming one drawable held by the scene.
///
/// Ids are handed out by a [`DrawableIdAllocator`] and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(u64);

impl DrawableId {
    /// Raw value, for logging and diagnostics.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DrawableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "drawable#{}", self.0)
    }
}

/// Monotonic source of [`DrawableId`]s, shared between a scene and the
/// change sets that feed it.
#[derive(Debug)]
pub struct DrawableIdAllocator {
    next: AtomicU64,
}

impl DrawableIdAllocator {
    /// A fresh allocator. The first id handed out is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Reserve the next id.
    pub fn allocate(&self) -> DrawableId {
        DrawableId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DrawableIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a shader program owned by the renderer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProgramId(pub u64);
