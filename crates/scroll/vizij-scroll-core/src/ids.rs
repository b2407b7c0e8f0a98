//! Identifiers for scenes, controllers and event listeners.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SceneId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ControllerId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

static NEXT_SCENE: AtomicU32 = AtomicU32::new(0);
static NEXT_CONTROLLER: AtomicU32 = AtomicU32::new(0);

impl SceneId {
    /// Process-wide unique id. Scenes move between controllers, so ids cannot
    /// be controller-local.
    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE.fetch_add(1, Ordering::Relaxed))
    }
}

impl ControllerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTROLLER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Monotonic allocator for listener ids, one per scene registry.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_listener: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
